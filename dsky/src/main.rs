extern crate clap;

use crossbeam_channel::bounded;
use log::{error, info};

use dsky_core::clock::SystemClock;
use dsky_core::{consts, interp, ColdStartTrigger, Dsky, DskyConfig, MacroSet};
use dsky_periph::{
    spawn_key_listener, Emitter, JsonMacroStore, PeriphError, Session, SessionEvent, TcpSink,
    WriterSink,
};

use std::io::BufRead;

fn build_app<'a, 'b>() -> clap::App<'a, 'b> {
    let about = "DSKY is a replica of the Apollo Guidance Computer display and keyboard panel";
    let c = clap::App::new("DSKY Replica")
        .version("0.1")
        .about(about)
        .arg(
            clap::Arg::with_name("macros")
                .long("macros")
                .takes_value(true)
                .help("JSON file with the F1..F5 function key macros"),
        )
        .arg(
            clap::Arg::with_name("serial")
                .long("serial")
                .takes_value(true)
                .conflicts_with("telemetry")
                .help("Existing serial device receiving the telemetry stream"),
        )
        .arg(
            clap::Arg::with_name("telemetry")
                .long("telemetry")
                .takes_value(true)
                .help("Address to serve the telemetry stream on, e.g. 127.0.0.1:19800"),
        )
        .arg(
            clap::Arg::with_name("keys")
                .long("keys")
                .takes_value(true)
                .help("Address to accept key tokens on, e.g. 127.0.0.1:19697"),
        )
        .arg(
            clap::Arg::with_name("hex-codes")
                .long("hex-codes")
                .help("Accept A-F while keying VERB, NOUN and PROG"),
        )
        .arg(
            clap::Arg::with_name("flash")
                .long("flash")
                .help("Flash the VERB/NOUN/PROG code while it is being keyed in"),
        )
        .arg(
            clap::Arg::with_name("lamp-test-ms")
                .long("lamp-test-ms")
                .takes_value(true)
                .help("Duration of the LAMP key override"),
        )
        .arg(
            clap::Arg::with_name("overflow-reset")
                .long("overflow-reset")
                .help("RSET also cold starts when R1 shows AAAAA"),
        )
        .arg(
            clap::Arg::with_name("strict-noun")
                .long("strict-noun")
                .help("Committing a NOUN never runs V37 or V16 N36"),
        )
        .subcommand(
            clap::SubCommand::with_name("console")
                .help("Read key tokens from stdin and print the panel after each change"),
        )
        .subcommand(
            clap::SubCommand::with_name("script")
                .help("Apply a key sequence and print every emitted payload")
                .arg(
                    clap::Arg::with_name("tokens")
                        .index(1)
                        .multiple(true)
                        .required(true)
                        .help("Key tokens, e.g. VERB 3 5 ENTR"),
                ),
        )
        .subcommand(
            clap::SubCommand::with_name("verbs").help("List known verbs, nouns and macros"),
        );
    c
}

fn fetch_config<'a>() -> clap::ArgMatches<'a> {
    let a = build_app().get_matches();
    a
}

fn parse_ms(matches: &clap::ArgMatches, name: &str, default: u32) -> Option<u32> {
    match matches.value_of(name) {
        Some(v) => match v.parse::<u32>() {
            Ok(x) => Some(x),
            _ => {
                error!("Invalid --{} value: {:?}", name, v);
                None
            }
        },
        None => Some(default),
    }
}

fn build_dsky_config(matches: &clap::ArgMatches) -> Option<DskyConfig> {
    let defaults = DskyConfig::default();
    let cold_start = if matches.is_present("overflow-reset") {
        ColdStartTrigger::RestartLampOrOverflow
    } else {
        ColdStartTrigger::RestartLamp
    };

    Some(DskyConfig {
        lamp_test_ms: parse_ms(matches, "lamp-test-ms", defaults.lamp_test_ms)?,
        flash_ms: if matches.is_present("flash") {
            consts::FLASH_MS
        } else {
            defaults.flash_ms
        },
        hex_codes: matches.is_present("hex-codes"),
        noun_entry_executes: !matches.is_present("strict-noun"),
        cold_start,
    })
}

fn load_macros(matches: &clap::ArgMatches) -> Result<MacroSet, PeriphError> {
    match matches.value_of("macros") {
        Some(path) => JsonMacroStore::new(path).load(),
        None => Ok(MacroSet::defaults()),
    }
}

fn build_emitter(matches: &clap::ArgMatches) -> Result<Option<Emitter>, PeriphError> {
    if let Some(path) = matches.value_of("serial") {
        return Ok(Some(Emitter::spawn(WriterSink::open_device(path)?)?));
    }
    if let Some(addr) = matches.value_of("telemetry") {
        return Ok(Some(Emitter::spawn(TcpSink::bind(addr)?)?));
    }
    Ok(None)
}

fn stdin_thread(tx: crossbeam_channel::Sender<SessionEvent>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(x) => x,
            _ => break,
        };
        for token in line.split_whitespace() {
            if tx.send(SessionEvent::Key(token.to_string())).is_err() {
                return;
            }
        }
    }
    let _res = tx.send(SessionEvent::Shutdown);
}

fn print_dictionaries(macros: &MacroSet) {
    println!("Verbs:");
    for (code, desc) in interp::verbs() {
        println!("  V{}  {}", code, desc);
    }
    println!("Nouns:");
    for (code, desc) in interp::nouns() {
        println!("  N{}  {}", code, desc);
    }
    println!("Macros:");
    for (slot, m) in macros.iter() {
        println!("  F{}  {}", slot + 1, m.name);
    }
}

fn run_script(
    matches: &clap::ArgMatches,
    dsky: Dsky<MacroSet, SystemClock>,
) -> Result<(), PeriphError> {
    let sub_matches = match matches.subcommand_matches("script") {
        Some(x) => x,
        None => return Ok(()),
    };

    // Payloads go to stdout unless another sink was requested
    let emitter = match build_emitter(matches)? {
        Some(e) => e,
        None => Emitter::spawn(WriterSink::stdout())?,
    };
    let mut session = Session::new(dsky, Some(emitter))?;

    for token in sub_matches.values_of("tokens").into_iter().flatten() {
        session.dispatch(SessionEvent::Key(token.to_string()));
    }
    eprintln!("{}", session.dsky().frame());
    Ok(())
}

fn run_console(
    matches: &clap::ArgMatches,
    dsky: Dsky<MacroSet, SystemClock>,
    ctrlc_rx: crossbeam_channel::Receiver<()>,
) -> Result<(), PeriphError> {
    let emitter = build_emitter(matches)?;
    let mut session = Session::new(dsky, emitter)?;

    if let Some(addr) = matches.value_of("keys") {
        spawn_key_listener(addr, session.sender())?;
    }

    let tx = session.sender();
    std::thread::spawn(move || stdin_thread(tx));

    // Forward the ctrl-c signal into the session so it stops between events
    let tx = session.sender();
    std::thread::spawn(move || {
        if ctrlc_rx.recv().is_ok() {
            let _res = tx.send(SessionEvent::Shutdown);
        }
    });

    println!("{}\n", session.dsky().frame());
    session.run(|dsky, _outcome| {
        println!("{}\n", dsky.frame());
    });
    Ok(())
}

fn main() {
    env_logger::init();

    // Register for a ctrlc handler which will push a signal to the application.
    // If the signal handler is pushed multiple times without closing, then force
    // closing the application.
    let (ctrlc_tx, ctrlc_rx) = bounded(1);
    let res = ctrlc::set_handler(move || {
        if ctrlc_tx.is_full() {
            std::process::exit(-1);
        }
        let _res = ctrlc_tx.send(());
    });

    match res {
        Err(x) => {
            error!("Unable to register signal handler. {:?}.", x);
            return;
        }
        _ => {}
    }

    let matches = fetch_config();
    let config = match build_dsky_config(&matches) {
        Some(c) => c,
        None => return,
    };
    let macros = match load_macros(&matches) {
        Ok(m) => m,
        Err(e) => {
            error!("Unable to load macros: {}", e);
            return;
        }
    };
    info!("DSKY: {:?}, {} macros", config, macros.iter().count());

    let res = match matches.subcommand_name() {
        Some("console") => {
            let dsky = Dsky::new(config, macros, SystemClock);
            run_console(&matches, dsky, ctrlc_rx)
        }
        Some("script") => {
            let dsky = Dsky::new(config, macros, SystemClock);
            run_script(&matches, dsky)
        }
        Some("verbs") => {
            print_dictionaries(&macros);
            Ok(())
        }
        _ => {
            error!("Invalid subcommand. Exiting");
            return;
        }
    };

    if let Err(e) = res {
        error!("{}", e);
    }
}
