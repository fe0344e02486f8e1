use crate::config::settings::MapViewSettings;
use crate::core::markers::escape_html;
use crate::domain::model::{MapMarker, SupplierRecord};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Client-side map options, serialized into the page next to the data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientMapConfig<'a> {
    center: [f64; 2],
    zoom: u8,
    tile_url: &'a str,
    attribution: &'a str,
    marker_radius: u32,
}

/// Makes serialized JSON safe to place inside a `<script>` element.
fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/").replace("<!--", "<\\u0021--")
}

/// Renders the complete page.
///
/// `records` is embedded unpruned; the page script derives its own markers
/// from it. `markers` is the unfiltered server-side marker set and only feeds
/// the initial counter and the `<noscript>` listing.
pub fn render_page(
    records: &[SupplierRecord],
    markers: &[MapMarker],
    view: &MapViewSettings,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let records_json = json_for_script_tag(&serde_json::to_string(records)?);
    let config_json = json_for_script_tag(&serde_json::to_string(&ClientMapConfig {
        center: [view.center_lat, view.center_lng],
        zoom: view.zoom,
        tile_url: &view.tile_url,
        attribution: &view.attribution,
        marker_radius: view.marker_radius,
    })?);

    let title = escape_html(&view.title);
    let marker_count = markers.len();
    let generated_iso = generated_at.to_rfc3339();
    let generated_label = generated_at.format("%d/%m/%Y %H:%M UTC");
    let fallback_items: String = markers
        .iter()
        .map(|marker| format!("<li>{}</li>", marker.popup_html()))
        .collect();

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1.0"/>
<meta name="generated-at" content="{generated_iso}"/>
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet/dist/leaflet.js"></script>

<style>
body {{ margin:0; font-family: Arial, sans-serif; }}
#map {{ height: 100vh; }}

.control-panel {{
    position:absolute;
    bottom:20px;
    right:20px;
    z-index:1000;
    background:white;
    padding:10px;
    border-radius:10px;
    box-shadow:0 4px 12px rgba(0,0,0,0.25);
    width:240px;
    max-height:300px;
    overflow-y:auto;
}}

.control-panel input,
.control-panel select {{
    width:100%;
    padding:6px;
    margin-bottom:8px;
    box-sizing:border-box;
    font-size:14px;
    height:34px;
}}

.control-panel .summary {{ font-size:12px; color:#555; }}
.fallback {{ margin:20px; font-size:13px; }}
.fallback li {{ margin-bottom:8px; }}
</style>
</head>
<body>

<div class="control-panel">
    <input type="text" id="searchInput" placeholder="Buscar fornecedor...">
    <select id="examFilter">
        <option value="">Filtrar por exame</option>
    </select>
    <div class="summary">
        <span id="resultCount">{marker_count}</span> fornecedor(es) no mapa<br>
        Atualizado em {generated_label}
    </div>
</div>

<div id="map"></div>

<noscript>
<ul class="fallback">{fallback_items}</ul>
</noscript>

<script>
var fornecedores = {records_json};
var mapConfig = {config_json};

function escapeHtml(value) {{
    return String(value)
        .replace(/&/g, '&amp;')
        .replace(/</g, '&lt;')
        .replace(/>/g, '&gt;')
        .replace(/"/g, '&quot;')
        .replace(/'/g, '&#39;');
}}

function parseNumber(value) {{
    if (value === null || value === undefined) return null;
    var n = parseFloat(value);
    return isFinite(n) ? n : null;
}}

function formatAmount(value) {{
    if (value === null || value === undefined) return '-';
    var n = parseNumber(value);
    if (n === null) return String(value);
    return n.toFixed(2).replace('.', ',');
}}

function servicesOf(f) {{
    return Array.isArray(f.servicos) ? f.servicos : [];
}}

// Mirrors filter_markers: coordinates must parse, name matches the search
// text in any case, a selected service keeps only its own offerings.
function filterSuppliers(records, searchText, selectedService) {{
    var needle = searchText.toLowerCase();
    var visible = [];

    records.forEach(function(f) {{
        if (!String(f.nome).toLowerCase().includes(needle)) return;

        var lat = parseNumber(f.endereco_latitude);
        var lng = parseNumber(f.endereco_longitude);
        if (lat === null || lng === null) return;

        var offerings = servicesOf(f);
        if (selectedService) {{
            offerings = offerings.filter(function(s) {{ return s.servico === selectedService; }});
            if (offerings.length === 0) return;
        }}

        visible.push({{ lat: lat, lng: lng, supplier: f, offerings: offerings }});
    }});

    return visible;
}}

function popupHtml(name, offerings) {{
    var body = offerings.map(function(ex) {{
        var service = ex.servico == null ? '' : ex.servico;
        return '<div style="margin-bottom:4px;"><b>' + escapeHtml(service) + '</b><br>' +
            'Pagar: R$ ' + escapeHtml(formatAmount(ex.valor_a_pagar)) +
            ' | Cobrar: R$ ' + escapeHtml(formatAmount(ex.valor_a_cobrar)) + '</div>';
    }}).join('');

    return "<div style='max-height:200px; overflow-y:auto; font-size:13px;'>" +
        "<b style='font-size:14px;'>" + escapeHtml(name) + "</b><br><br>" +
        body + "</div>";
}}

var map = L.map('map').setView(mapConfig.center, mapConfig.zoom);

L.tileLayer(mapConfig.tileUrl, {{
    attribution: mapConfig.attribution
}}).addTo(map);

var markersLayer = L.layerGroup().addTo(map);
var searchInput = document.getElementById('searchInput');
var examSelect = document.getElementById('examFilter');
var resultCount = document.getElementById('resultCount');

var examesSet = new Set();
fornecedores.forEach(function(f) {{
    servicesOf(f).forEach(function(s) {{
        if (s.servico != null) examesSet.add(s.servico);
    }});
}});

Array.from(examesSet).sort().forEach(function(exame) {{
    var option = document.createElement('option');
    option.value = exame;
    option.text = exame;
    examSelect.appendChild(option);
}});

function renderMarkers() {{
    markersLayer.clearLayers();

    var visible = filterSuppliers(fornecedores, searchInput.value, examSelect.value);

    visible.forEach(function(m) {{
        L.circleMarker([m.lat, m.lng], {{ radius: mapConfig.markerRadius }})
            .bindPopup(popupHtml(m.supplier.nome, m.offerings), {{
                maxWidth: 260,
                autoPan: true,
                closeButton: true
            }})
            .addTo(markersLayer);
    }});

    resultCount.textContent = visible.length;
}}

renderMarkers();

searchInput.addEventListener('input', renderMarkers);
examSelect.addEventListener('change', renderMarkers);
</script>
</body>
</html>
"####
    );

    Ok(html)
}
