use anyhow::{Context, Result};
use clap::Parser;
use class_packages::annotation::{Annotation, AnnotationKind};
use class_packages::cli::{Cli, Commands, OutputFormat};
use class_packages::config::{describe, load_universe, resolve_sources};
use class_packages::package::JavaPackage;
use class_packages::universe::{Classes, JavaClass};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    if let Err(e) = run(&cli) {
        eprintln!("[class-packages] Error: {e:#}");
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let sources = resolve_sources(cli)?;
    for source in &sources {
        tracing::debug!(source = %describe(source), "using class universe source");
    }
    let universe = load_universe(&sources)?;

    let content = match &cli.command {
        Commands::Tree { package } => {
            let package = JavaPackage::of(&universe, package)?;
            let tree = PackageTree::of(&package);
            render(cli.format, &tree, || tree.to_text())?
        }
        Commands::Classes {
            package,
            exposed,
            single,
        } => {
            let mut package = JavaPackage::of(&universe, package)?;
            if *single {
                package = package.to_single();
            }
            let classes = if *exposed {
                package.exposed_classes()
            } else {
                package.classes().clone()
            };
            let output = ClassesOutput::of(&package, &classes);
            render(cli.format, &output, || classes.format(package.name()))?
        }
        Commands::Annotation {
            package,
            annotation_type,
        } => {
            let kind = AnnotationKind::new(annotation_type.as_str())?;
            let package = JavaPackage::of(&universe, package)?;
            let annotation = package
                .find_annotation(&kind)
                .with_context(|| format!("Failed to resolve {kind} for package {}", package.name()))?;
            let output = AnnotationOutput {
                package: package.name().to_string(),
                annotation_type: kind.name().to_string(),
                annotation,
            };
            render(cli.format, &output, || match &output.annotation {
                Some(a) => format!("{a} (declared on {})", a.declared_on),
                None => format!("{} not found on {}", kind.abbreviated_name(), output.package),
            })?
        }
        Commands::Annotated {
            package,
            annotation_type,
        } => {
            let kind = AnnotationKind::new(annotation_type.as_str())?;
            let package = JavaPackage::of(&universe, package)?;
            let names: Vec<String> = package
                .sub_packages_annotated_with(&kind)
                .iter()
                .map(|p| p.name().to_string())
                .collect();
            render(cli.format, &names, || names.join("\n"))?
        }
        Commands::Stats => {
            let stats = UniverseStats::of(&universe);
            render(cli.format, &stats, || {
                format!(
                    "description: {}\nclasses: {}\npackages: {}\n",
                    stats.description, stats.classes, stats.packages
                )
            })?
        }
    };

    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn render<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Text => text(),
    })
}

#[derive(Debug, Serialize)]
struct PackageTree {
    name: String,
    classes: usize,
    sub_packages: Vec<PackageTree>,
}

impl PackageTree {
    fn of(package: &JavaPackage) -> Self {
        Self {
            name: package.name().to_string(),
            classes: package.to_single().classes().len(),
            sub_packages: package.direct_sub_packages().iter().map(PackageTree::of).collect(),
        }
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(0, &mut out);
        out
    }

    fn write_text(&self, depth: usize, out: &mut String) {
        out.push_str(&format!("{}{} ({})\n", "  ".repeat(depth), self.name, self.classes));
        for child in &self.sub_packages {
            child.write_text(depth + 1, out);
        }
    }
}

#[derive(Debug, Serialize)]
struct ClassesOutput<'a> {
    package: &'a str,
    includes_sub_packages: bool,
    classes: Vec<&'a JavaClass>,
}

impl<'a> ClassesOutput<'a> {
    fn of(package: &'a JavaPackage, classes: &'a Classes) -> Self {
        Self {
            package: package.name(),
            includes_sub_packages: package.includes_sub_packages(),
            classes: classes.iter().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AnnotationOutput {
    package: String,
    annotation_type: String,
    annotation: Option<Annotation>,
}

#[derive(Debug, Serialize)]
struct UniverseStats {
    description: String,
    classes: usize,
    packages: usize,
}

impl UniverseStats {
    fn of(universe: &Classes) -> Self {
        let packages: std::collections::BTreeSet<&str> =
            universe.iter().map(JavaClass::package_name).collect();
        Self {
            description: universe.description().to_string(),
            classes: universe.len(),
            packages: packages.len(),
        }
    }
}
