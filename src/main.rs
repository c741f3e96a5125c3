use clap::{Parser, ValueEnum};
use photo_picker::pick::{self, Picker};
use photo_picker::publish::PublishMode;
use photo_picker::{config, logging, output};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Operation {
    /// Scan the photo root and rewrite the weight cache
    Generate,
    /// Pick a photo and publish it to the output file
    Pick,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Parser)]
#[command(name = "photo-picker")]
#[command(version)]
#[command(about = "Weighted random photo picker for year-partitioned archives")]
#[command(long_about = "\
Weighted random photo picker for year-partitioned archives

Every immediate subdirectory of the input folder is a partition. A partition
is chosen in proportion to how many photos it holds, then one photo is chosen
uniformly inside it, resized, labelled, and swapped into the output file.

  photos/
  ├── 2021/
  ├── 2022/
  │   ├── IMG_0001.jpg
  │   └── trip/IMG_0042.JPG       # nested files count toward 2022
  └── 2023/

Partition counts are cached in a CSV file (default: weights.csv beside the
binary) and regenerated by 'pick' once older than a day.

Debug levels: 0 quiet, 1 log the selected item, 2 dry run (no output update).

Run 'photo-picker --op gen-config' to generate a documented config.toml.")]
struct Cli {
    /// Operation to run
    #[arg(long, value_enum, default_value_t = Operation::Pick)]
    op: Operation,

    /// Root photo folder
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Weight cache file
    #[arg(short, long)]
    weight: Option<PathBuf>,

    /// Destination image, replaced on each pick
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug level: 1 logs the selection, 2 also skips the output update
    #[arg(short, long, default_value_t = 0)]
    debug: u8,

    /// Config file overlaid on the stock defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.debug, cli.log_file.as_deref());

    match cli.op {
        Operation::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Operation::Generate => {
            let (_, picker) = build_picker(&cli)?;
            let table = picker.generate()?;
            output::print_weight_table(&table);
        }
        Operation::Pick => {
            let destination = cli.output.as_deref().ok_or("--output is required for pick")?;
            let (config, picker) = build_picker(&cli)?;
            let selection = picker.pick()?;
            output::print_selection(&selection);

            let backend = pick::backend_from_config(&config);
            let mode = PublishMode::from_debug_level(cli.debug);
            let published = picker.publish(selection, &backend, destination, mode)?;
            if cli.debug > 0 {
                output::print_published(&published);
            }
        }
    }

    Ok(())
}

/// Load config and resolve the root and cache paths shared by generate and pick.
fn build_picker(cli: &Cli) -> Result<(config::PickerConfig, Picker), Box<dyn std::error::Error>> {
    let config = config::load_config(cli.config.as_deref())?;
    let input = cli
        .input
        .as_deref()
        .ok_or("--input is required for this operation")?;
    let weight = cli
        .weight
        .clone()
        .unwrap_or_else(|| config::default_cache_path(&config));
    let picker = Picker::new(&config, input, &weight);
    Ok((config, picker))
}
