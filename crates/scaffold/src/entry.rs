//! Entry-script templates: the base layout per template and one
//! self-contained demo block per add-on.

use microlab_config::Addon;

use crate::markup::escape;

const STYLE_IMPORT: &str = "./style.css";

/// `src/main.ts` for the vanilla template.
pub fn vanilla_entry(title: &str, desc: &str) -> String {
    let title = template_literal_text(title);
    let desc = template_literal_text(desc);
    format!(
        r##"import "./style.css";
const root = document.querySelector<HTMLDivElement>("#app")!;
root.innerHTML = `
  <div class="container">
    <h1 class="text-3xl font-semibold">{title}</h1>
    <p class="mt-2 text-neutral-400">{desc}</p>
    <div id="demo" class="mt-4"></div>
    <button id="btn" class="btn mt-4">Ping</button>
    <pre id="out" class="mt-4 text-sm opacity-90"></pre>
  </div>
`;
document.getElementById("btn")!.addEventListener("click", () => {{
  const out = document.getElementById("out")!;
  out.textContent = "Time: " + new Date().toISOString();
}});
"##
    )
}

/// Result of rewriting the scaffolded React entry file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactEntry {
    pub source: String,
    /// False when no `StrictMode` block was found; the layout was not
    /// inserted in that case.
    pub layout_replaced: bool,
}

/// Prepend the stylesheet import if missing and replace the `StrictMode`
/// block (either `<StrictMode>` or `<React.StrictMode>`) with the layout.
pub fn rewrite_react_entry(source: &str, title: &str, desc: &str) -> ReactEntry {
    let mut text = if source.contains(STYLE_IMPORT) {
        source.to_string()
    } else {
        format!("import \"{STYLE_IMPORT}\";\n{source}")
    };

    let mut layout_replaced = false;
    for tag in ["React.StrictMode", "StrictMode"] {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        if let (Some(start), Some(end)) = (text.find(&open), text.rfind(&close))
            && start < end
        {
            let layout = react_layout(tag, title, desc);
            text.replace_range(start..end + close.len(), &layout);
            layout_replaced = true;
            break;
        }
    }

    ReactEntry {
        source: text,
        layout_replaced,
    }
}

fn react_layout(tag: &str, title: &str, desc: &str) -> String {
    let title = jsx_text(title);
    let desc = jsx_text(desc);
    format!(
        r#"<{tag}>
    <div className="container">
      <h1 className="text-3xl font-semibold">{title}</h1>
      <p className="mt-2 text-neutral-400">{desc}</p>
      <div id="demo" className="mt-4"></div>
      <button id="btn" className="btn mt-4">Ping</button>
      <pre id="out" className="mt-4 text-sm opacity-90"></pre>
    </div>
  </{tag}>"#
    )
}

/// The demo block an add-on appends to the entry file, if it has one.
/// Each block starts with a `// <name> demo` line.
pub fn addon_block(addon: Addon) -> Option<String> {
    let body = match addon {
        Addon::Three => THREE_DEMO,
        Addon::D3 => D3_DEMO,
        Addon::Charts => CHARTS_DEMO,
        Addon::Pwa => return None,
    };
    Some(format!("\n// {} demo\n{body}", addon.name()))
}

const THREE_DEMO: &str = r#"import * as THREE from "three";
const el = document.getElementById("demo")!;
const scene = new THREE.Scene();
const camera = new THREE.PerspectiveCamera(70, 640 / 360, 0.1, 100);
const renderer = new THREE.WebGLRenderer({ antialias: true });
renderer.setSize(640, 360);
el.appendChild(renderer.domElement);
const mesh = new THREE.Mesh(new THREE.BoxGeometry(1, 1, 1), new THREE.MeshNormalMaterial());
scene.add(mesh);
camera.position.z = 3;
(function tick() {
  mesh.rotation.y += 0.01;
  mesh.rotation.x += 0.008;
  renderer.render(scene, camera);
  requestAnimationFrame(tick);
})();
"#;

const D3_DEMO: &str = r##"import * as d3 from "d3";
const svg = d3.select("#demo").append("svg").attr("width", 640).attr("height", 240);
const data = [4, 8, 15, 16, 23, 42];
const x = d3.scaleBand().domain(data.map((_, i) => i)).range([24, 616]).padding(0.15);
const y = d3.scaleLinear().domain([0, d3.max(data) || 0]).nice().range([216, 16]);
svg.selectAll("rect").data(data).enter().append("rect")
  .attr("x", (_, i) => x(i))
  .attr("y", d => y(d))
  .attr("width", x.bandwidth())
  .attr("height", d => 216 - y(d))
  .attr("fill", "currentColor");
svg.append("g").attr("transform", "translate(0,216)").call(d3.axisBottom(x).tickFormat(() => ""));
"##;

const CHARTS_DEMO: &str = r#"import { Chart, BarController, BarElement, CategoryScale, LinearScale, Tooltip } from "chart.js";
Chart.register(BarController, BarElement, CategoryScale, LinearScale, Tooltip);
const canvas = document.createElement("canvas");
canvas.width = 640;
canvas.height = 240;
document.getElementById("demo")!.appendChild(canvas);
new Chart(canvas.getContext("2d")!, {
  type: "bar",
  data: { labels: ["A", "B", "C", "D"], datasets: [{ label: "Things", data: [3, 7, 4, 6] }] },
  options: { responsive: false, plugins: { tooltip: { enabled: true } } },
});
"#;

/// HTML text that also survives inside a JS template literal.
fn template_literal_text(raw: &str) -> String {
    escape(raw).replace('`', "&#96;").replace("${", "&#36;{")
}

/// HTML text that also survives as a JSX child.
fn jsx_text(raw: &str) -> String {
    escape(raw).replace('{', "&#123;").replace('}', "&#125;")
}
