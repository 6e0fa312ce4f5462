use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::{debug, error, warn};

use blkprobe::reader::device_size;
use blkprobe::{RequestFlags, Session, StepOutcome};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The device or disk image to probe
    device: PathBuf,

    /// Byte offset into the device to start probing at
    #[arg(long, default_value_t = 0)]
    offset: u64,

    /// Stop after the first match instead of walking the whole registry
    #[arg(long)]
    first_only: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        error!("blkprobe: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> std::io::Result<()> {
    let file = File::open(&args.device)?;
    let size = device_size(&file)?;
    debug!("probing {:?}: offset={} size={}", args.device, args.offset, size);

    let usable_size = size.saturating_sub(args.offset);
    let mut session: Session<File> = Session::new();
    session.set_request(RequestFlags::all_values());
    session.set_device(file, args.offset, usable_size);

    loop {
        match session.step() {
            Ok(StepOutcome::Match) => {
                print_match(&session);
                if args.first_only {
                    break;
                }
            }
            Ok(StepOutcome::Exhausted) => {
                if session.num_values() == 0 {
                    println!("no match");
                }
                break;
            }
            Err(e) => {
                warn!("step failed: {e}");
                break;
            }
        }
    }

    Ok(())
}

fn print_match(session: &Session<File>) {
    for i in 0..session.num_values() {
        let value = session.get_value(i).expect("index within num_values()");
        match value.as_str() {
            Some(text) => println!("{}={}", value.name, text),
            None => println!("{}=<{} bytes binary>", value.name, value.as_bytes().len()),
        }
    }
    println!();
}
