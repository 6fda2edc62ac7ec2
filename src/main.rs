use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tutorial_press::{config, generate, output, registry, resolve, types};

#[derive(Parser)]
#[command(name = "tutorial-press")]
#[command(about = "Static site generator for MDX tutorials")]
#[command(long_about = "\
Static site generator for MDX tutorials

Your filesystem is the route table. Every .mdx file under the content root
becomes one page, addressed by its path with the extension removed.

Project structure:

  .
  ├── config.toml                  # Site config (optional)
  └── content/tutorials/           # Content root
      ├── basics.mdx               # → /blog/basics
      └── intro/
          ├── setup.mdx            # → /blog/intro/setup
          └── diagram.png          # Linked from setup.mdx → /tutorial_files/<hash>-diagram.png

Metadata resolution (first available wins):
  Metadata: YAML front matter → TOML front matter → export const meta = {...}
  Title:    meta title → first # heading → file name (dashes → spaces)

Run 'tutorial-press gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Project directory (holds config.toml and the content root)
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log debug diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every route the content root produces
    Routes {
        /// Print the route parameter sets as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load and validate all content without writing output
    Check,
    /// Generate the static site
    Build,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Routes { json } => {
            let site_config = config::load_config(&cli.source)?;
            let root = site_config.content_root_in(&cli.source);
            let routes = resolve::list_routes(&root, &site_config.extension)?;
            if json {
                let manifest = types::RoutesManifest::from_routes(&routes);
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            } else {
                output::print_routes(&routes, &root);
            }
        }
        Command::Check => {
            let site_config = config::load_config(&cli.source)?;
            let root = site_config.content_root_in(&cli.source);
            println!("==> Checking {}", root.display());
            let registry = registry::ContentRegistry::build(&root, &site_config.extension)?;
            output::print_check(&registry, &root);
            println!("==> Content is valid");
        }
        Command::Build => {
            let site_config = config::load_config(&cli.source)?;
            println!(
                "==> Building {} → {}",
                site_config.content_root_in(&cli.source).display(),
                cli.output.display()
            );
            let report = generate::generate(&cli.source, &site_config, &cli.output)?;
            output::print_build(&report, &site_config);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so command output stays pipeable.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` applies, defaulting to
/// warnings only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
