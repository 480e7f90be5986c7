use palsave::{
    BaseCampWorkerData, GroupRecord, GuildLayout, RawData, WorkAssignment, WorkElement,
};
use std::env;
use std::error;
use std::io::{self, Read, Write};
use std::process;

const USAGE: &str = "usage: json <group DISCRIMINATOR [prefixed] | work DISCRIMINATOR | assign | base-camp> < blob";

fn main() -> Result<(), Box<dyn error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let stdin = io::stdin();
    let mut data = Vec::new();
    stdin.lock().read_to_end(&mut data)?;

    let record = match args.as_slice() {
        ["group", discriminator] => {
            RawData::Group(GroupRecord::decode(&data, discriminator, GuildLayout::Current)?)
        }
        ["group", discriminator, "prefixed"] => {
            RawData::Group(GroupRecord::decode(&data, discriminator, GuildLayout::Prefixed)?)
        }
        ["work", discriminator] => RawData::Work(WorkElement::decode(&data, discriminator)?),
        ["assign"] => RawData::WorkAssignment(WorkAssignment::decode(&data)?),
        ["base-camp"] => RawData::BaseCampWorker(BaseCampWorkerData::decode(&data)?),
        _ => {
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &record)?;
    writeln!(out)?;
    Ok(())
}
