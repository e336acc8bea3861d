//! Embedded single-page frontend.

/// Embedded frontend HTML with CSS and JavaScript. Charts use Plotly from its CDN.
pub const FRONTEND_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>COTLab</title>
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
    <style>
        * { box-sizing: border-box; }
        body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; color: #262730; background: #fff; }
        #app { display: flex; min-height: 100vh; }
        aside { width: 320px; padding: 16px; background: #f0f2f6; overflow-y: auto; max-height: 100vh; position: sticky; top: 0; }
        aside h2 { font-size: 18px; margin: 4px 0 12px; }
        aside h3 { font-size: 14px; margin: 18px 0 6px; }
        aside label { display: block; font-size: 13px; margin: 8px 0 4px; }
        aside select, aside input { width: 100%; padding: 6px; border: 1px solid #ccc; border-radius: 4px; font-size: 13px; }
        aside select[multiple] { height: 110px; }
        .caption { font-size: 12px; color: #6b6f7b; margin: 4px 0; }
        .warning { font-size: 13px; color: #8a6d00; background: #fff7d6; padding: 6px; border-radius: 4px; }
        main { flex: 1; padding: 16px 28px; min-width: 0; }
        h1 { font-size: 26px; margin: 8px 0 12px; }
        .tabs { display: flex; gap: 4px; border-bottom: 1px solid #ddd; margin-bottom: 16px; }
        .tab { padding: 8px 14px; cursor: pointer; border: none; background: none; font-size: 14px; border-bottom: 2px solid transparent; }
        .tab.active { border-bottom-color: #ff4b4b; color: #ff4b4b; }
        .hidden { display: none; }
        .info { background: #e8f0fe; padding: 10px; border-radius: 4px; font-size: 14px; }
        .error { background: #fde8e8; color: #9b1c1c; padding: 10px; border-radius: 4px; font-size: 14px; margin: 6px 0; }
        .metrics { display: flex; gap: 24px; margin: 12px 0; }
        .metric .label { font-size: 12px; color: #6b6f7b; }
        .metric .value { font-size: 22px; }
        .metric .delta { font-size: 12px; }
        .delta.up { color: #09ab3b; } .delta.down { color: #ff2b2b; }
        button.primary { padding: 8px 14px; border: 1px solid #ccc; border-radius: 4px; background: #fff; cursor: pointer; }
        button.primary:hover { border-color: #ff4b4b; color: #ff4b4b; }
        table { border-collapse: collapse; width: 100%; font-size: 13px; }
        th, td { border-bottom: 1px solid #eee; text-align: left; padding: 6px 8px; }
        th { background: #fafafa; }
        hr { border: none; border-top: 1px solid #eee; margin: 24px 0; }
    </style>
</head>
<body>
<div id="app">
    <aside>
        <h2>Filters</h2>

        <label for="types">Commodity Type</label>
        <select id="types" multiple></select>
        <div class="caption">None selected shows every type.</div>

        <h3>Price Data Filter</h3>
        <select id="price">
            <option value="all">All</option>
            <option value="with">With Price Data</option>
            <option value="without">Without Price Data</option>
        </select>

        <h3>Open Interest Filter</h3>
        <label for="oi-min">Min Open Interest</label>
        <input id="oi-min" type="number" min="0" step="1000" value="0">
        <label for="oi-max">Max Open Interest</label>
        <input id="oi-max" type="number" min="0" step="10000">

        <label for="commodity">Select Commodity</label>
        <select id="commodity"></select>
        <div id="commodity-count" class="caption"></div>

        <h3>Date Range</h3>
        <label for="start">Start</label>
        <input id="start" type="date">
        <label for="end">End</label>
        <input id="end" type="date">

        <h3>Left Y-Axis (Primary)</h3>
        <label for="left-formula">Formula (e.g., Prod/Merc Long + Prod/Merc Short)</label>
        <input id="left-formula" type="text" placeholder="(MM Long - MM Short) / Open Interest">
        <label for="left">Or select columns for left axis</label>
        <select id="left" multiple></select>

        <h3>Right Y-Axis (Secondary)</h3>
        <label for="right-formula">Formula (e.g., % OI MM Long - % OI MM Short)</label>
        <input id="right-formula" type="text">
        <label for="right">Or select columns for right axis</label>
        <select id="right" multiple></select>
    </aside>

    <main>
        <h1>Commodities COT Data Visualization</h1>
        <div class="tabs">
            <button class="tab active" data-tab="viz">Visualization</button>
            <button class="tab" data-tab="ref">Column Reference</button>
        </div>

        <section id="tab-viz">
            <div id="empty" class="info hidden"></div>
            <div id="content" class="hidden">
                <h2 id="title"></h2>
                <div id="meta"></div>
                <div id="chart"></div>
                <div id="formula-errors"></div>

                <hr>
                <h2>Price Data</h2>
                <div id="price-caption" class="caption"></div>
                <div id="price-metrics" class="metrics"></div>
                <div id="price-chart"></div>
                <div id="price-message" class="info hidden"></div>

                <hr>
                <button id="download" class="primary">Download CSV</button>
            </div>
        </section>

        <section id="tab-ref" class="hidden">
            <h2>Column Reference Guide</h2>
            <p>Technical column names, the short names used in charts and formulas, and what each column represents.</p>
            <table>
                <thead><tr><th>Technical Name</th><th>Short Name</th><th>Description</th></tr></thead>
                <tbody id="reference"></tbody>
            </table>
            <h3>Key Terms</h3>
            <ul>
                <li><b>Producer/Merchant</b>: commercial traders who use futures markets to hedge their business activities</li>
                <li><b>Swap Dealer</b>: entities that deal in swaps and use futures markets to hedge swap transactions</li>
                <li><b>Money Manager</b>: managed money traders including CTAs, CPOs, and hedge funds</li>
                <li><b>Other Reportable</b>: other large traders who don't fit into the above categories</li>
                <li><b>Non-Reportable</b>: smaller traders whose positions are below reporting thresholds</li>
                <li><b>Open Interest</b>: total number of outstanding contracts</li>
            </ul>
        </section>
    </main>
</div>

<script>
const $ = (id) => document.getElementById(id);
const DEFAULT_LEFT = ["Open_Interest_All"];
const DEFAULT_RIGHT = ["Pct_of_OI_M_Money_Long_All", "Pct_of_OI_M_Money_Short_All"];
let boundsFor = null;

function selected(el) {
    return Array.from(el.selectedOptions).map((o) => o.value);
}

function fillSelect(el, items, chosen) {
    el.innerHTML = "";
    for (const { value, label } of items) {
        const opt = document.createElement("option");
        opt.value = value;
        opt.textContent = label;
        opt.selected = chosen.includes(value);
        el.appendChild(opt);
    }
}

async function getJson(path, params) {
    const qs = new URLSearchParams();
    for (const [k, v] of Object.entries(params || {})) {
        if (v !== null && v !== undefined) qs.set(k, v);
    }
    const resp = await fetch(qs.toString() ? `${path}?${qs}` : path);
    if (!resp.ok) throw new Error(await resp.text());
    return resp.json();
}

function rangeParams() {
    return {
        commodity: $("commodity").value,
        start: $("start").value || null,
        end: $("end").value || null,
    };
}

function showEmpty(msg) {
    $("content").classList.add("hidden");
    $("empty").classList.remove("hidden");
    $("empty").textContent = msg;
}

async function loadColumns() {
    const cols = await getJson("/api/columns");
    const items = cols.metrics.map((m) => ({ value: m.name, label: m.short_name }));
    fillSelect($("left"), items, DEFAULT_LEFT);
    fillSelect($("right"), items, DEFAULT_RIGHT);
    $("reference").innerHTML = cols.reference
        .map((c) => `<tr><td><code>${c.name}</code></td><td>${c.short_name}</td><td>${c.description}</td></tr>`)
        .join("");
}

async function loadTypes() {
    const types = await getJson("/api/types");
    fillSelect($("types"), types.map((t) => ({ value: t, label: t })), []);
}

async function loadCommodities() {
    const previous = $("commodity").value;
    const resp = await getJson("/api/commodities", {
        types: selected($("types")).join(","),
        price: $("price").value,
        oi_min: $("oi-min").value || null,
        oi_max: $("oi-max").value || null,
    });
    if ($("oi-max").value === "" && resp.max_oi !== null) {
        $("oi-max").value = Math.ceil(resp.max_oi);
    }
    const names = resp.commodities.map((c) => c.commodity_name);
    fillSelect($("commodity"), names.map((n) => ({ value: n, label: n })), [names.includes(previous) ? previous : names[0]]);
    if (names.length) {
        $("commodity-count").innerHTML = `${names.length} commodities match filters`;
    } else {
        $("commodity-count").innerHTML = `<div class="warning">No commodities match the selected filters</div>`;
    }
    await onCommodityChange();
}

async function onCommodityChange() {
    if (!$("commodity").value) {
        showEmpty("Select a commodity from the sidebar to begin");
        return;
    }
    if (boundsFor !== $("commodity").value) {
        $("start").value = "";
        $("end").value = "";
    }
    await refresh();
}

async function refresh() {
    const commodity = $("commodity").value;
    if (!commodity) return;
    let data;
    try {
        data = await getJson("/api/series", {
            ...rangeParams(),
            left: selected($("left")).join(","),
            right: selected($("right")).join(","),
            left_formula: $("left-formula").value || null,
            right_formula: $("right-formula").value || null,
        });
    } catch (e) {
        showEmpty(e.message);
        return;
    }
    $("empty").classList.add("hidden");
    $("content").classList.remove("hidden");

    if (data.bounds) {
        for (const id of ["start", "end"]) {
            $(id).min = data.bounds.start;
            $(id).max = data.bounds.end;
        }
        if (boundsFor !== commodity) {
            $("start").value = data.bounds.start;
            $("end").value = data.bounds.end;
            boundsFor = commodity;
        }
    }

    $("title").textContent = commodity;
    const meta = [];
    if (data.commodity.commodity_type) meta.push(`Type: ${data.commodity.commodity_type}`);
    if (data.commodity.exchange_name) meta.push(`Exchange: ${data.commodity.exchange_name}`);
    if (data.range) meta.push(`Data from ${data.range.start} to ${data.range.end}`);
    $("meta").innerHTML = meta.map((m) => `<div class="caption">${m}</div>`).join("");

    drawChart(data);
    const errors = [];
    if (data.formula_errors.left) errors.push(`Left axis formula error: ${data.formula_errors.left}`);
    if (data.formula_errors.right) errors.push(`Right axis formula error: ${data.formula_errors.right}`);
    $("formula-errors").innerHTML = errors.map((e) => `<div class="error">${e}</div>`).join("");

    await loadPrices();
}

function drawChart(data) {
    if (!data.traces.length) {
        Plotly.purge($("chart"));
        $("chart").innerHTML = `<div class="info">Select columns or enter formulas in the sidebar to visualize</div>`;
        return;
    }
    $("chart").innerHTML = "";
    const traces = data.traces.map((t) => {
        const trace = {
            x: data.dates, y: t.values, mode: "lines", name: t.name,
            line: { width: 2 }, yaxis: t.axis === "right" ? "y2" : "y",
        };
        if (t.column === null) trace.line.color = t.axis === "right" ? "#ff7f0e" : "#1f77b4";
        return trace;
    });
    Plotly.newPlot($("chart"), traces, {
        xaxis: { title: "Date", showgrid: true, gridcolor: "rgba(128,128,128,0.2)" },
        yaxis: { title: "Left Axis", showgrid: true, gridcolor: "rgba(128,128,128,0.2)", side: "left" },
        yaxis2: { title: "Right Axis", overlaying: "y", side: "right", showgrid: false },
        hovermode: "x unified",
        height: 700,
        legend: { orientation: "h", yanchor: "bottom", y: 1.02, xanchor: "right", x: 1 },
        margin: { l: 60, r: 60, t: 20, b: 60 },
    }, { responsive: true });
}

function fmt(v) {
    return `$${v.toFixed(2)}`;
}

async function loadPrices() {
    $("price-metrics").innerHTML = "";
    $("price-caption").textContent = "";
    Plotly.purge($("price-chart"));
    $("price-message").classList.add("hidden");

    let data;
    try {
        data = await getJson("/api/prices", rangeParams());
    } catch (e) {
        $("price-message").textContent = e.message;
        $("price-message").classList.remove("hidden");
        return;
    }
    if (data.mapping && data.mapping.ticker_symbol) {
        const icon = data.mapping.verified ? "✅" : "⚠️";
        $("price-caption").textContent = `${icon} Ticker: ${data.mapping.ticker_symbol} (${data.mapping.ticker_type || "unknown"})`;
    }
    if (data.message) {
        $("price-message").textContent = data.message;
        $("price-message").classList.remove("hidden");
    }
    if (!data.bars.length) return;

    Plotly.newPlot($("price-chart"), [{
        x: data.bars.map((b) => b.date),
        y: data.bars.map((b) => b.close),
        mode: "lines",
        name: "Close Price",
        line: { width: 2, color: "#2ca02c" },
    }], {
        xaxis: { title: "Date" },
        yaxis: { title: "Price ($)" },
        hovermode: "x unified",
        height: 400,
        margin: { l: 60, r: 20, t: 20, b: 60 },
    }, { responsive: true });

    const s = data.stats;
    if (s) {
        const pct = s.change_pct === null ? "" : `${s.change_pct.toFixed(1)}%`;
        const cls = s.change >= 0 ? "up" : "down";
        $("price-metrics").innerHTML = [
            ["Latest Price", fmt(s.latest), ""],
            ["Min Price", fmt(s.min), ""],
            ["Max Price", fmt(s.max), ""],
            ["Change", fmt(s.change), `<div class="delta ${cls}">${pct}</div>`],
        ].map(([l, v, d]) => `<div class="metric"><div class="label">${l}</div><div class="value">${v}</div>${d}</div>`).join("");
    }
}

function download() {
    const qs = new URLSearchParams();
    for (const [k, v] of Object.entries(rangeParams())) if (v) qs.set(k, v);
    window.location = `/api/export?${qs}`;
}

document.querySelectorAll(".tab").forEach((btn) => btn.addEventListener("click", () => {
    document.querySelectorAll(".tab").forEach((b) => b.classList.toggle("active", b === btn));
    $("tab-viz").classList.toggle("hidden", btn.dataset.tab !== "viz");
    $("tab-ref").classList.toggle("hidden", btn.dataset.tab !== "ref");
}));
for (const id of ["types", "price", "oi-min", "oi-max"]) $(id).addEventListener("change", loadCommodities);
$("commodity").addEventListener("change", onCommodityChange);
for (const id of ["start", "end", "left", "right", "left-formula", "right-formula"]) $(id).addEventListener("change", refresh);
$("download").addEventListener("click", download);

(async () => {
    try {
        await loadColumns();
        await loadTypes();
        await loadCommodities();
    } catch (e) {
        showEmpty(`Could not reach the server: ${e.message}`);
    }
})();
</script>
</body>
</html>
"##;
