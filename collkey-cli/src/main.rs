//! collkey CLI - Command-line tool for collation sort keys
//!
//! This binary provides command-line interfaces for:
//! - key: print sort keys for strings
//! - compare: compare two strings
//! - sort: sort lines of a file or stdin in collation order
//! - bocsu: encode or decode identical-level code point runs
//! - reorder: show how a script order moves primary lead bytes
//! - export-data / inspect-data: write and describe collation data images

use clap::{Args, Parser, Subcommand, ValueEnum};
use collkey_codec::sample::SAMPLE_DESCRIPTION;
use collkey_codec::{
    parse_reorder_code, reorder_code_name, sample_root, AlternateHandling, CaseFirst,
    CollationData, Collator, Limits, MaxVariable, Strength, VecSink,
};
use collkey_format::bocsu::{decode_identical_level_run, write_identical_level_run};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "collkey")]
#[command(about = "Collation sort key CLI tool")]
#[command(version)]
struct Cli {
    /// Collation data image (defaults to the built-in sample data)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print sort keys for strings
    ///
    /// Examples:
    ///   collkey key "côte" "cote"
    ///   collkey key "a-b" --alternate shifted --strength quaternary --format json
    Key {
        /// Strings to build keys for
        #[arg(required = true)]
        text: Vec<String>,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Compare two strings and print <, = or >
    Compare {
        /// Left-hand string
        left: String,
        /// Right-hand string
        right: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Sort lines in collation order
    ///
    /// Examples:
    ///   collkey sort words.txt
    ///   cat words.txt | collkey sort --reorder Grek,Latn --unique
    Sort {
        /// Input file, one string per line (stdin if omitted or "-")
        input: Option<PathBuf>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Descending order
        #[arg(long)]
        reverse: bool,
        /// Keep only the first of lines with equal sort keys
        #[arg(long)]
        unique: bool,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Encode text as a BOCSU run, or decode one
    Bocsu {
        /// Text to encode; hex code points with --code-points; hex bytes with --decode
        input: String,
        /// Treat input as hex code points ("61 301" or "U+0061,U+0301")
        #[arg(long, conflicts_with = "decode")]
        code_points: bool,
        /// Decode hex run bytes back into code points
        #[arg(long)]
        decode: bool,
    },
    /// Show the lead-byte ranges a script order produces
    ///
    /// Examples:
    ///   collkey reorder Grek,Latn
    ///   collkey reorder digit Hebr --format json
    Reorder {
        /// Script codes or group names, in the requested order
        #[arg(required = true, value_delimiter = ',')]
        codes: Vec<String>,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Write collation data (by default the built-in sample) as a binary image
    ExportData {
        /// Output image file
        #[arg(short, long)]
        output: PathBuf,
        /// Description stored in the image header
        #[arg(long, default_value = SAMPLE_DESCRIPTION)]
        description: String,
    },
    /// Describe a collation data image
    InspectData {
        /// Image file
        input: PathBuf,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StrengthArg {
    Primary,
    Secondary,
    Tertiary,
    Quaternary,
    Identical,
}

impl From<StrengthArg> for Strength {
    fn from(arg: StrengthArg) -> Self {
        match arg {
            StrengthArg::Primary => Strength::Primary,
            StrengthArg::Secondary => Strength::Secondary,
            StrengthArg::Tertiary => Strength::Tertiary,
            StrengthArg::Quaternary => Strength::Quaternary,
            StrengthArg::Identical => Strength::Identical,
        }
    }
}

/// Collation settings shared by the commands that build keys
#[derive(Args, Debug, Clone, Default)]
struct SettingsArgs {
    /// TOML file with collation settings; flags override its values
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Comparison strength
    #[arg(long, value_enum)]
    strength: Option<StrengthArg>,
    /// Variable weight handling (non-ignorable, shifted)
    #[arg(long)]
    alternate: Option<AlternateHandling>,
    /// Case ordering (off, lower, upper)
    #[arg(long)]
    case_first: Option<CaseFirst>,
    /// Add a case level between the secondary and tertiary levels
    #[arg(long)]
    case_level: bool,
    /// Compare secondary weights from the end (French accent order)
    #[arg(long)]
    backward_secondary: bool,
    /// Highest variable group (space, punct, symbol, currency)
    #[arg(long)]
    max_variable: Option<MaxVariable>,
    /// Script order, comma separated (e.g. Grek,Latn,digit)
    #[arg(long, value_delimiter = ',')]
    reorder: Vec<String>,
}

/// Settings file layout, e.g.
///
/// ```toml
/// strength = "quaternary"
/// alternate = "shifted"
/// reorder = ["Grek", "Latn"]
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
struct SettingsFile {
    strength: Option<StrengthArg>,
    alternate: Option<String>,
    case_first: Option<String>,
    case_level: Option<bool>,
    backward_secondary: Option<bool>,
    max_variable: Option<String>,
    reorder: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read settings file {}: {source}", .path.display())]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings file {}: {source}", .path.display())]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid hex byte string '{0}'")]
    InvalidHex(String),
    #[error("invalid code point '{0}'")]
    InvalidCodePoint(String),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Key {
            text,
            format,
            settings,
        } => {
            let collator = build_collator(load_data(cli.data.as_deref())?, &settings)?;
            handle_key(&collator, &text, format, &mut io::stdout().lock())?;
        }
        Commands::Compare {
            left,
            right,
            settings,
        } => {
            let collator = build_collator(load_data(cli.data.as_deref())?, &settings)?;
            let symbol = match collator.compare(&left, &right)? {
                Ordering::Less => "<",
                Ordering::Equal => "=",
                Ordering::Greater => ">",
            };
            println!("{}", symbol);
        }
        Commands::Sort {
            input,
            output,
            reverse,
            unique,
            settings,
        } => {
            let collator = build_collator(load_data(cli.data.as_deref())?, &settings)?;
            handle_sort(&collator, input.as_deref(), output.as_deref(), reverse, unique)?;
        }
        Commands::Bocsu {
            input,
            code_points,
            decode,
        } => {
            println!("{}", handle_bocsu(&input, code_points, decode)?);
        }
        Commands::Reorder { codes, format } => {
            let data = load_data(cli.data.as_deref())?;
            let report = build_reorder_report(data, &codes)?;
            match format {
                OutputFormat::Table => print_reorder_table(&report, &mut io::stdout().lock())?,
                OutputFormat::Json => print_json(&report)?,
            }
        }
        Commands::ExportData {
            output,
            description,
        } => {
            let data = load_data(cli.data.as_deref())?;
            let image = data.to_image(&description)?;
            fs::write(&output, &image)?;
            info!(bytes = image.len(), path = %output.display(), "wrote data image");
            println!("Wrote {} bytes to {}", image.len(), output.display());
        }
        Commands::InspectData { input, format } => {
            let bytes = fs::read(&input)?;
            let report = inspect_image(&bytes)?;
            match format {
                OutputFormat::Table => print_inspect_table(&report, &mut io::stdout().lock())?,
                OutputFormat::Json => print_json(&report)?,
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_data(path: Option<&Path>) -> Result<Arc<CollationData>, Box<dyn Error>> {
    match path {
        Some(path) => {
            let bytes = fs::read(path)?;
            let data = CollationData::from_image(&bytes, &Limits::default())?;
            debug!(path = %path.display(), bytes = bytes.len(), "loaded data image");
            Ok(Arc::new(data))
        }
        None => Ok(sample_root()?),
    }
}

fn read_settings_file(path: &Path) -> Result<SettingsFile, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::SettingsRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| CliError::SettingsParse {
        path: path.to_path_buf(),
        source,
    })
}

fn build_collator(
    data: Arc<CollationData>,
    args: &SettingsArgs,
) -> Result<Collator, Box<dyn Error>> {
    let file = match &args.settings {
        Some(path) => read_settings_file(path)?,
        None => SettingsFile::default(),
    };

    let alternate = match args.alternate {
        Some(alternate) => Some(alternate),
        None => file
            .alternate
            .as_deref()
            .map(str::parse::<AlternateHandling>)
            .transpose()?,
    };
    let case_first = match args.case_first {
        Some(case_first) => Some(case_first),
        None => file
            .case_first
            .as_deref()
            .map(str::parse::<CaseFirst>)
            .transpose()?,
    };
    let max_variable = match args.max_variable {
        Some(max_variable) => Some(max_variable),
        None => file
            .max_variable
            .as_deref()
            .map(str::parse::<MaxVariable>)
            .transpose()?,
    };
    let reorder = if args.reorder.is_empty() {
        &file.reorder
    } else {
        &args.reorder
    };

    let mut collator = Collator::new(data);
    if let Some(strength) = args.strength.or(file.strength) {
        collator.set_strength(strength.into());
    }
    if let Some(max_variable) = max_variable {
        collator.set_max_variable(max_variable)?;
    }
    {
        let settings = collator.settings_mut();
        if let Some(alternate) = alternate {
            settings.alternate = alternate;
        }
        if let Some(case_first) = case_first {
            settings.case_first = case_first;
        }
        settings.case_level = args.case_level || file.case_level.unwrap_or(false);
        settings.backward_secondary =
            args.backward_secondary || file.backward_secondary.unwrap_or(false);
    }
    if !reorder.is_empty() {
        let codes = parse_reorder_codes(reorder)?;
        collator.set_reordering(&codes)?;
    }

    debug!(settings = %collator.settings(), "collator ready");
    Ok(collator)
}

fn parse_reorder_codes(names: &[String]) -> Result<Vec<i32>, Box<dyn Error>> {
    names
        .iter()
        .map(|name| parse_reorder_code(name).map_err(Into::into))
        .collect()
}

fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_hex_bytes(input: &str) -> Result<Vec<u8>, CliError> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if digits.len() % 2 != 0 {
        return Err(CliError::InvalidHex(input.to_string()));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| CliError::InvalidHex(input.to_string()))
        })
        .collect()
}

fn parse_code_points(input: &str) -> Result<Vec<u32>, CliError> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let hex = token
                .strip_prefix("U+")
                .or_else(|| token.strip_prefix("u+"))
                .or_else(|| token.strip_prefix("0x"))
                .unwrap_or(token);
            u32::from_str_radix(hex, 16).map_err(|_| CliError::InvalidCodePoint(token.to_string()))
        })
        .collect()
}

fn format_code_points(code_points: &[u32]) -> String {
    code_points
        .iter()
        .map(|c| format!("U+{:04X}", c))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Serialize)]
struct KeyReport {
    text: String,
    key: String,
    length: usize,
}

fn handle_key(
    collator: &Collator,
    texts: &[String],
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    let mut reports = Vec::with_capacity(texts.len());
    for text in texts {
        let key = collator.sort_key(text)?;
        reports.push(KeyReport {
            text: text.clone(),
            key: format_hex(&key),
            length: key.len(),
        });
    }

    match format {
        OutputFormat::Table => {
            for report in &reports {
                writeln!(out, "{}\t{}", report.key, report.text)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &reports)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Sort `lines` by their sort keys; equal keys keep their input order.
fn sort_lines(
    collator: &Collator,
    lines: Vec<String>,
    reverse: bool,
    unique: bool,
) -> Result<Vec<String>, Box<dyn Error>> {
    let keys = lines
        .par_iter()
        .map(|line| collator.sort_key(line))
        .collect::<Result<Vec<_>, _>>()?;

    let mut keyed: Vec<(Vec<u8>, String)> = keys.into_iter().zip(lines).collect();
    if reverse {
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
    }
    if unique {
        keyed.dedup_by(|a, b| a.0 == b.0);
    }
    Ok(keyed.into_iter().map(|(_, line)| line).collect())
}

fn handle_sort(
    collator: &Collator,
    input: Option<&Path>,
    output: Option<&Path>,
    reverse: bool,
    unique: bool,
) -> Result<(), Box<dyn Error>> {
    let mut text = String::new();
    match input {
        Some(path) if path != Path::new("-") => {
            File::open(path)?.read_to_string(&mut text)?;
        }
        _ => {
            io::stdin().read_to_string(&mut text)?;
        }
    }
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let count = lines.len();
    let sorted = sort_lines(collator, lines, reverse, unique)?;
    info!(lines = count, kept = sorted.len(), "sorted");

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    for line in &sorted {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

fn handle_bocsu(input: &str, code_points: bool, decode: bool) -> Result<String, Box<dyn Error>> {
    if decode {
        let bytes = parse_hex_bytes(input)?;
        let decoded = decode_identical_level_run(&bytes)?;
        return Ok(format_code_points(&decoded));
    }
    let cps = if code_points {
        parse_code_points(input)?
    } else {
        input.chars().map(u32::from).collect()
    };
    let mut sink = VecSink::with_capacity(cps.len() * 2);
    write_identical_level_run(0, &cps, &mut sink)?;
    Ok(format_hex(sink.as_bytes()))
}

/// Groups listed by `reorder` and `inspect-data`, in default order.
const GROUP_NAMES: [&str; 11] = [
    "space", "punct", "symbol", "currency", "digit", "latn", "grek", "cyrl", "hebr", "hang",
    "hani",
];

#[derive(Debug, Clone, Serialize)]
struct RangeEntry {
    limit: String,
    offset: i16,
}

#[derive(Debug, Clone, Serialize)]
struct GroupEntry {
    name: String,
    first_primary: String,
    last_primary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reordered_first: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ReorderReport {
    codes: Vec<i32>,
    ranges: Vec<RangeEntry>,
    groups: Vec<GroupEntry>,
}

fn group_entries(data: &CollationData, collator: Option<&Collator>) -> Vec<GroupEntry> {
    GROUP_NAMES
        .iter()
        .filter_map(|&name| {
            let code = parse_reorder_code(name).ok()?;
            let first = data.get_first_primary_for_group(code);
            if first == 0 {
                return None;
            }
            Some(GroupEntry {
                name: reorder_code_name(code).unwrap_or(name).to_string(),
                first_primary: format!("{:08x}", first),
                last_primary: format!("{:08x}", data.get_last_primary_for_group(code)),
                reordered_first: collator
                    .map(|c| format!("{:08x}", c.settings().reorder(first))),
            })
        })
        .collect()
}

fn build_reorder_report(
    data: Arc<CollationData>,
    names: &[String],
) -> Result<ReorderReport, Box<dyn Error>> {
    let codes = parse_reorder_codes(names)?;
    let mut collator = Collator::new(Arc::clone(&data));
    collator.set_reordering(&codes)?;

    let ranges = collator
        .settings()
        .reorder_ranges()
        .iter()
        .map(|&r| RangeEntry {
            limit: format!("{:04x}", r >> 16),
            offset: r as i16,
        })
        .collect();
    Ok(ReorderReport {
        codes,
        ranges,
        groups: group_entries(&data, Some(&collator)),
    })
}

fn print_reorder_table(report: &ReorderReport, out: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    let names: Vec<String> = report
        .codes
        .iter()
        .map(|&c| reorder_code_name(c).map_or_else(|| c.to_string(), str::to_string))
        .collect();
    writeln!(out, "Order: {}", names.join(", "))?;
    if !report.ranges.is_empty() {
        writeln!(out, "Split ranges:")?;
        for range in &report.ranges {
            writeln!(out, "  below {}xxxx  offset {:+}", range.limit, range.offset)?;
        }
    }
    writeln!(out, "{:<10} {:>10} {:>10} {:>10}", "group", "first", "last", "reordered")?;
    for group in &report.groups {
        writeln!(
            out,
            "{:<10} {:>10} {:>10} {:>10}",
            group.name,
            group.first_primary,
            group.last_primary,
            group.reordered_first.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
struct InspectReport {
    description: String,
    image_bytes: usize,
    flags: u32,
    has_jamo: bool,
    numeric_primary: String,
    num_scripts: usize,
    groups: Vec<GroupEntry>,
}

fn inspect_image(bytes: &[u8]) -> Result<InspectReport, Box<dyn Error>> {
    let header = CollationData::read_image_header(bytes)?;
    let data = CollationData::from_image(bytes, &Limits::default())?;
    Ok(InspectReport {
        description: header.description.clone(),
        image_bytes: bytes.len(),
        flags: header.flags,
        has_jamo: header.has_jamo(),
        numeric_primary: format!("{:08x}", data.numeric_primary()),
        num_scripts: data.num_scripts(),
        groups: group_entries(&data, None),
    })
}

fn print_inspect_table(report: &InspectReport, out: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    writeln!(out, "Description:     {}", report.description)?;
    writeln!(out, "Image size:      {} bytes", report.image_bytes)?;
    writeln!(out, "Flags:           0x{:08x}", report.flags)?;
    writeln!(out, "Jamo table:      {}", if report.has_jamo { "yes" } else { "no" })?;
    writeln!(out, "Numeric primary: {}", report.numeric_primary)?;
    writeln!(out, "Scripts:         {}", report.num_scripts)?;
    writeln!(out)?;
    writeln!(out, "{:<10} {:>10} {:>10}", "group", "first", "last")?;
    for group in &report.groups {
        writeln!(
            out,
            "{:<10} {:>10} {:>10}",
            group.name, group.first_primary, group.last_primary
        )?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}
