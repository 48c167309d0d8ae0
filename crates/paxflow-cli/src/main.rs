use paxflow_layout::{
    FlowRecord, LayoutConfig, LinkSpec, NodeSpec, SectionSpec, TimeWindow, TimelineConfig,
    VerticalConfig, compute_layout, layout_graph, layout_sections, layout_vertical, synthesize,
};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PAXFLOW_LOG";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(paxflow_layout::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<paxflow_layout::Error> for CliError {
    fn from(value: paxflow_layout::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Synthesize,
    Timeline,
    Vertical,
}

#[derive(Debug, Clone, Copy, Default)]
enum Preset {
    #[default]
    Station,
    Trip,
    Interchange,
}

impl FromStr for Preset {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "station" => Ok(Self::Station),
            "trip" => Ok(Self::Trip),
            "interchange" => Ok(Self::Interchange),
            _ => Err(()),
        }
    }
}

impl Preset {
    fn config(self) -> LayoutConfig {
        match self {
            Preset::Station => LayoutConfig::station(),
            Preset::Trip => LayoutConfig::trip(),
            Preset::Interchange => LayoutConfig::interchange(),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    preset: Preset,
    pretty: bool,
    verbose: bool,
    out: Option<String>,
}

/// Either a ready node/link set or raw flow records to synthesize first.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LayoutRequest {
    source_nodes: Vec<NodeSpec>,
    target_nodes: Vec<NodeSpec>,
    links: Vec<LinkSpec>,
    flows: Option<Vec<FlowRecord>>,
    window: Option<TimeWindow>,
    config: Option<LayoutConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest {
    #[serde(default)]
    source_nodes: Vec<NodeSpec>,
    #[serde(default)]
    target_nodes: Vec<NodeSpec>,
    flows: Vec<FlowRecord>,
    window: TimeWindow,
}

#[derive(Debug, Deserialize)]
struct SectionsRequest<C> {
    sections: Vec<SectionSpec>,
    #[serde(default)]
    config: C,
}

fn usage() -> &'static str {
    "paxflow-cli\n\
\n\
USAGE:\n\
  paxflow-cli [layout] [--preset station|trip|interchange] [--pretty] [--verbose] [--out <path>] [<path>|-]\n\
  paxflow-cli synthesize [--pretty] [--verbose] [--out <path>] [<path>|-]\n\
  paxflow-cli timeline [--pretty] [--verbose] [--out <path>] [<path>|-]\n\
  paxflow-cli vertical [--pretty] [--verbose] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the JSON request is read from stdin.\n\
  - layout accepts sourceNodes/targetNodes/links, or flows plus a window to synthesize first.\n\
  - A config object in the request replaces the --preset config.\n\
  - Diagnostics go to stderr; set PAXFLOW_LOG (e.g. debug) or pass --verbose.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "synthesize" => args.command = Command::Synthesize,
            "timeline" => args.command = Command::Timeline,
            "vertical" => args.command = Command::Vertical,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            "--preset" => {
                let Some(preset) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.preset = preset
                    .parse::<Preset>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" if args.input.is_none() => args.input = Some("-".to_string()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    bytes.push(b'\n');
    match out {
        None | Some("-") => std::io::stdout().lock().write_all(&bytes)?,
        Some(path) => std::fs::write(path, bytes)?,
    }
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let out = args.out.as_deref();
    tracing::debug!(command = ?args.command, bytes = text.len(), "read request");

    match args.command {
        Command::Layout => {
            let req: LayoutRequest = serde_json::from_str(&text)?;
            let config = req.config.unwrap_or_else(|| args.preset.config());
            let layout = match req.flows {
                Some(flows) => {
                    let window = req.window.ok_or(paxflow_layout::Error::MissingWindow)?;
                    let graph = synthesize(&req.source_nodes, &req.target_nodes, &flows, window)?;
                    layout_graph(&graph, &config)?
                }
                None => {
                    compute_layout(&req.source_nodes, &req.target_nodes, &req.links, &config)?
                }
            };
            write_json(&layout, args.pretty, out)
        }
        Command::Synthesize => {
            let req: SynthesizeRequest = serde_json::from_str(&text)?;
            let graph = synthesize(&req.source_nodes, &req.target_nodes, &req.flows, req.window)?;
            write_json(&graph, args.pretty, out)
        }
        Command::Timeline => {
            let req: SectionsRequest<TimelineConfig> = serde_json::from_str(&text)?;
            let layout = layout_sections(&req.sections, &req.config)?;
            write_json(&layout, args.pretty, out)
        }
        Command::Vertical => {
            let req: SectionsRequest<VerticalConfig> = serde_json::from_str(&text)?;
            let layout = layout_vertical(&req.sections, &req.config)?;
            write_json(&layout, args.pretty, out)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
