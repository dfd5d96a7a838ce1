use selafin_reader::selafin::export::text::{self, DumpOptions};
use selafin_reader::selafin::export::vtu::{self, TimestepSelection, VtuOptions};
use selafin_reader::{OpenOptions, Result, SelafinReader};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

const USAGE: &str = "Usage:
  selafin info [-v] [-f] <file>
      -v  Verbose output (list every timestamp and the IPARAM table)
      -f  Force mode: continue past framing errors and trailing data
  selafin dump [-v] [-b] [-o dir] <file>
      -v  Verbose output
      -b  Write variable data as binary f64 instead of text
      -o  Output directory
  selafin vtu [-c] [-F] [-z Z] [-u U] [-v V] [-w W] [-t T | -f n] [-o dir] <file>
      -c  Verbose output
      -F  Force mode
      -z, -u, -v, -w  Variable indices for height and velocity components
      -t  Export the single timestep T
      -f  Export every n-th timestep
      -o  Output directory";

/// Getopt-style parse result: switches seen, option values, positional args.
struct Parsed {
    switches: Vec<char>,
    values: HashMap<char, String>,
    positional: Vec<String>,
}

impl Parsed {
    fn has(&self, flag: char) -> bool {
        self.switches.contains(&flag)
    }

    fn number<T: std::str::FromStr>(&self, flag: char) -> std::result::Result<Option<T>, String> {
        match self.values.get(&flag) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| format!("The -{} option requires a non-negative integer, got '{}'", flag, raw)),
            None => Ok(None),
        }
    }

    fn single_file(&self) -> std::result::Result<&str, String> {
        match self.positional.as_slice() {
            [file] => Ok(file.as_str()),
            _ => Err("A single SELAFIN file must be provided".to_string()),
        }
    }
}

fn parse_args(args: &[String], switches: &str, valued: &str) -> std::result::Result<Parsed, String> {
    let mut parsed = Parsed {
        switches: Vec::new(),
        values: HashMap::new(),
        positional: Vec::new(),
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut chars = arg.chars();
        if chars.next() != Some('-') || arg.len() != 2 {
            parsed.positional.push(arg.clone());
            continue;
        }
        let Some(flag) = chars.next() else {
            continue;
        };
        if switches.contains(flag) {
            parsed.switches.push(flag);
        } else if valued.contains(flag) {
            let value = iter
                .next()
                .ok_or_else(|| format!("The -{} option requires a value", flag))?;
            parsed.values.insert(flag, value.clone());
        } else {
            return Err(format!("Unrecognised option '-{}'", flag));
        }
    }
    Ok(parsed)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    let rest = &args[2..];
    let outcome = match args[1].as_str() {
        "info" => parse_args(rest, "vf", "").map(run_info),
        "dump" => parse_args(rest, "vb", "o").map(run_dump),
        "vtu" => parse_args(rest, "cF", "zuvwtfo").map(run_vtu),
        "-h" | "--help" | "help" => {
            println!("{}", USAGE);
            return;
        }
        other => Err(format!("Unknown command '{}'", other)),
    };

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(message)) | Err(message) => {
            eprintln!("ERROR: {}", message);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    }
}

/// Runs a command body, turning decode errors into a printed failure.
fn report(result: Result<()>) -> std::result::Result<(), String> {
    if let Err(e) = result {
        eprintln!("\nERROR: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run_info(parsed: Parsed) -> std::result::Result<(), String> {
    let file = parsed.single_file()?;
    let verbose = parsed.has('v');
    let force = parsed.has('f');
    init_logging(verbose);

    println!("\nOpening results file {}:", base_name(file));
    let mut reader = match SelafinReader::open_with(file, OpenOptions::new().force(force)) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("** Errors found - aborting: {}", e);
            if !force {
                eprintln!("Run in force mode (-f) to attempt to continue");
            }
            std::process::exit(1);
        }
    };

    report(print_info(&mut reader, verbose))
}

fn print_info(reader: &mut SelafinReader, verbose: bool) -> Result<()> {
    let header = reader.header();
    println!("\nTitle: \t\t{}\nFormat: \t{}", header.title, header.format);
    if let Some(date) = header.date {
        println!("Date: \t\t{}", date);
    }

    if verbose {
        println!("\nIPARAM table:");
        for (i, value) in header.iparam.iter().enumerate() {
            println!("\t{}: {}", i + 1, value);
        }
    }

    println!("\nRecorded variables:");
    for (i, name) in header.var_names.iter().enumerate() {
        println!("\t{}: {}", i, name);
    }

    let mesh = reader.mesh();
    let bounds = mesh.bounds;
    println!(
        "\nCoordinate Range:\n\tX: {:+}, {:+}\n\tY: {:+}, {:+}",
        bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y
    );
    println!(
        "\n{} Nodes\n{} Elements\n{} nodes per element",
        mesh.npoin, mesh.nelem, mesh.ndp
    );

    println!("\nSimulation Times:");
    let count = reader.timestep_count();
    if verbose {
        for (t, time) in reader.load_timestamps()?.iter().enumerate() {
            println!("\t{}: {:+}", t, time);
        }
    } else {
        println!("\t{} timesteps", count);
        if count > 0 {
            let first = reader.read_timestamp(0)?;
            let last = reader.read_timestamp(count - 1)?;
            println!("\tSimulation start: t = {:+}", first);
            println!("\tSimulation end:   t = {:+}", last);
        }
        println!("\tRun again with verbose flag to list individual timestamps");
    }

    println!("\nEnd.");
    Ok(())
}

fn run_dump(parsed: Parsed) -> std::result::Result<(), String> {
    let file = parsed.single_file()?;
    let verbose = parsed.has('v');
    init_logging(verbose);

    let opts = DumpOptions {
        output_dir: parsed
            .values
            .get(&'o')
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        binary: parsed.has('b'),
    };

    report((|| -> Result<()> {
        let mut reader = SelafinReader::open(file)?;
        let written = text::dump(&mut reader, &base_name(file), &opts)?;
        println!("Wrote {} files to {}", written.len(), opts.output_dir.display());
        Ok(())
    })())
}

fn run_vtu(parsed: Parsed) -> std::result::Result<(), String> {
    let file = parsed.single_file()?;
    init_logging(parsed.has('c'));

    let defaults = VtuOptions::default();
    let single = parsed.number::<u32>('t')?;
    let every = parsed.number::<u32>('f')?;
    let selection = match (single, every) {
        (Some(_), Some(_)) => {
            return Err("Single timestep and output frequency options are mutually exclusive".to_string());
        }
        (_, Some(0)) => return Err("Print frequency must be greater than 0".to_string()),
        (Some(t), None) => TimestepSelection::Single(t),
        (None, Some(n)) => TimestepSelection::Every(n),
        (None, None) => defaults.selection,
    };

    let opts = VtuOptions {
        z: parsed.number('z')?.unwrap_or(defaults.z),
        u: parsed.number('u')?.unwrap_or(defaults.u),
        v: parsed.number('v')?.unwrap_or(defaults.v),
        w: parsed.number('w')?.unwrap_or(defaults.w),
        selection,
        output_dir: parsed
            .values
            .get(&'o')
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir),
    };
    let options = OpenOptions::new().force(parsed.has('F'));

    report((|| -> Result<()> {
        let mut reader = SelafinReader::open_with(file, options)?;
        let written = vtu::export(&mut reader, &base_name(file), &opts)?;
        println!(
            "{} VTK files successfully written in {}",
            written.len(),
            opts.output_dir.display()
        );
        Ok(())
    })())
}
