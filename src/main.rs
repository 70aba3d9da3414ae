use clap::{Parser, Subcommand, ValueEnum};
use rosgraph_explorer::{
    ExplorerError, config,
    controller::{Controller, Event},
    diff, dump, export,
    filter::{PatternSet, Which},
    graph::{Attributes, EntityKind},
    render,
};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use anyhow::Context;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "rosgraph-explorer")]
#[command(about = "Filter and export ROS 2 graph snapshots", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply include/exclude patterns to a dump and export the visible subgraph.
    Filter {
        #[arg(long)]
        dump: PathBuf,

        /// Include pattern (regex, unanchored). Repeatable.
        #[arg(long)]
        include: Vec<String>,

        /// Exclude pattern (regex, unanchored). Repeatable; wins over include.
        #[arg(long)]
        exclude: Vec<String>,

        /// Add an entity's full name as an include pattern. Repeatable.
        #[arg(long)]
        pick_include: Vec<String>,

        /// Add an entity's full name as an exclude pattern. Repeatable.
        #[arg(long)]
        pick_exclude: Vec<String>,

        /// JSON filter preset applied before the command-line patterns.
        #[arg(long)]
        preset: Option<PathBuf>,

        /// Hide parameter services and the parameter_events topic.
        #[arg(long)]
        hide_parameter_services: bool,

        #[arg(long)]
        out_json: Option<PathBuf>,

        #[arg(long)]
        out_svg: Option<PathBuf>,
    },

    /// Print one entity with its attributes and connections.
    Show {
        #[arg(long)]
        dump: PathBuf,

        name: String,

        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Compare two dumps.
    Diff {
        #[arg(long)]
        before: PathBuf,

        #[arg(long)]
        after: PathBuf,

        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Process,
    Stream,
    Channel,
}

impl From<KindArg> for EntityKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Process => EntityKind::Process,
            KindArg::Stream => EntityKind::Stream,
            KindArg::Channel => EntityKind::Channel,
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn,rosgraph_explorer=info",
        1 => "info,rosgraph_explorer=debug",
        _ => "debug,rosgraph_explorer=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Commands::Filter {
            dump,
            include,
            exclude,
            pick_include,
            pick_exclude,
            preset,
            hide_parameter_services,
            out_json,
            out_svg,
        } => {
            let mut controller = Controller::new().with_renderer(Box::new(render::SvgRenderer::new()));

            // 1) Load the snapshot.
            let doc = dump::read_document(&dump)?;
            controller
                .handle(Event::LoadDump(doc))
                .with_context(|| format!("load dump {}", dump.display()))?;

            // 2) Presets first, then explicit patterns.
            let mut base = PatternSet::new();
            if hide_parameter_services {
                base.merge(&PatternSet::parameter_services());
            }
            if let Some(path) = &preset {
                let set = config::FilterPreset::load(path)?
                    .to_pattern_set()
                    .with_context(|| format!("compile filter preset {}", path.display()))?;
                base.merge(&set);
            }
            if !base.is_empty() {
                controller.apply_patterns(&base)?;
            }

            for text in &include {
                controller.add_pattern(Which::Include, text)?;
            }
            for text in &exclude {
                controller.add_pattern(Which::Exclude, text)?;
            }

            // 3) Pick-to-filter: unknown names are skipped with a warning.
            let picks = pick_include
                .iter()
                .map(|n| (Which::Include, n))
                .chain(pick_exclude.iter().map(|n| (Which::Exclude, n)));
            for (which, name) in picks {
                match controller.add_from_entity(which, name) {
                    Err(ExplorerError::EntityNotFound { .. }) => {}
                    other => {
                        other?;
                    }
                }
            }

            // 4) Summary + exports.
            let visible = controller
                .current_visible()
                .context("no visible subgraph after recompute")?;
            for kind in EntityKind::ALL {
                println!(
                    "{:>8}: {} / {}",
                    kind.to_string() + "s",
                    visible.entities_of_kind(kind).count(),
                    visible.graph().entities_of_kind(kind).len()
                );
            }
            println!(
                "connections: {} / {}",
                visible.connection_count(),
                visible.graph().connections().len()
            );

            if let Some(out) = &out_json {
                let json = export::to_json_pretty(&controller.export_data()?)?;
                std::fs::write(out, json).with_context(|| format!("write {}", out.display()))?;
                println!("Wrote {}", out.display());
            }
            if let Some(out) = &out_svg {
                let svg = controller.export_image()?;
                std::fs::write(out, svg).with_context(|| format!("write {}", out.display()))?;
                println!("Wrote {}", out.display());
            }
        }

        Commands::Show { dump, name, kind } => {
            let graph = dump::load_file(&dump)?;

            let entity = match kind {
                Some(k) => graph.find_entity(&name, k.into())?,
                None => EntityKind::ALL
                    .iter()
                    .find_map(|k| graph.find_entity(&name, *k).ok())
                    .ok_or_else(|| ExplorerError::EntityNotFound {
                        name: name.clone(),
                        kind: None,
                    })?,
            };

            println!("{} {}", entity.kind, entity.name);
            match &entity.attributes {
                Attributes::Process { parameters } => {
                    for p in parameters {
                        match &p.type_name {
                            Some(t) => println!("  param {} = {} ({})", p.name, p.value, t),
                            None => println!("  param {} = {}", p.name, p.value),
                        }
                    }
                }
                Attributes::Medium {
                    type_name,
                    message_schema,
                } => {
                    println!("  type {}", type_name);
                    for line in message_schema {
                        println!("    {}", line);
                    }
                }
            }
            for conn in graph.connections_of(&name) {
                println!("  {}", conn);
            }
        }

        Commands::Diff { before, after, out } => {
            let before = dump::load_file(&before)?;
            let after = dump::load_file(&after)?;
            let result = diff::diff(&before, &after);
            let json = serde_json::to_string_pretty(&result)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}
