//TODO: update clap to remove the need for this
#![allow(dangerous_implicit_autorefs)]

use clap::{crate_description, crate_name, crate_version, App, Arg, ArgGroup};
use narc::{create, extract, list};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = App::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .arg(
            Arg::with_name("directory")
                .help("Directory to pack from or unpack to")
                .short("d")
                .long("directory")
                .takes_value(true)
                .value_name("DIR")
                .required_unless("list"),
        )
        .arg(
            Arg::with_name("file")
                .help("Archive to pack to or unpack from")
                .short("f")
                .long("file")
                .required(true)
                .takes_value(true)
                .value_name("FILE"),
        )
        .arg(
            Arg::with_name("pack")
                .help("Pack DIR into FILE")
                .short("p")
                .long("pack"),
        )
        .arg(
            Arg::with_name("unpack")
                .help("Unpack FILE into DIR")
                .short("u")
                .long("unpack"),
        )
        .arg(
            Arg::with_name("list")
                .help("List the files in FILE")
                .short("l")
                .long("list"),
        )
        .group(
            ArgGroup::with_name("action")
                .args(&["pack", "unpack", "list"])
                .required(true),
        )
        .get_matches();

    let archive = matches.value_of("file").unwrap();
    if matches.is_present("pack") {
        create(archive, matches.value_of("directory").unwrap())?;
    } else if matches.is_present("unpack") {
        extract(archive, matches.value_of("directory").unwrap())?;
    } else {
        list(archive)?;
    }
    Ok(())
}
