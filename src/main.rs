#[cfg(not(feature = "playback"))]
fn main() {
    eprintln!(
        "The cdaudio CLI requires the \"playback\" feature. Rebuild with `--features playback` to enable audio output."
    );
}

#[cfg(feature = "playback")]
mod cli {
    use std::env;
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;

    use anyhow::Context;
    use cdaudio::{
        BackendChoice, CapItem, CdAudio, CommandFlags, DevCapsParams, DeviceId, DiscoveryPolicy,
        EmuConfig, ModeCode, Opcode, OpenParams, Outcome, Params, PlayParams, ResultCode,
        SeekParams, SetParams, StatusItem, StatusParams, TimeFormat,
    };
    use num_traits::FromPrimitive;

    /// Minimal stderr logger; `--verbose` raises the level to debug.
    struct StderrLogger;

    impl log::Log for StderrLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                eprintln!("{}: {}", record.level(), record.args());
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: StderrLogger = StderrLogger;

    const DEV: DeviceId = DeviceId(1);

    fn usage() {
        eprintln!(
            "Usage:\n  cdaudio [--config <file.json>] [--backend <null|sink|oneshot>] [--assume] [--verbose] [ROOT]\n\nFlags:\n  --config <file>   Load emulator configuration from a JSON file\n  --backend <mode>  Select the playback backend (default from config)\n  --assume          Assume 18 tracks instead of scanning ROOT\n  --verbose         Debug logging to stderr\n  -h, --help        Show this help\n\nROOT is the directory holding track02.wav .. track99.wav.\n\nPrompt commands: play [n], stop, pause, resume, seek <n>,\n                 status, caps, format <tmsf|track>, quit"
        );
    }

    fn backend_from_str(value: &str) -> Option<BackendChoice> {
        match value.to_ascii_lowercase().as_str() {
            "null" => Some(BackendChoice::Null),
            "sink" => Some(BackendChoice::Sink),
            "oneshot" => Some(BackendChoice::OneShot),
            _ => None,
        }
    }

    fn handled(outcome: Outcome) -> ResultCode {
        match outcome {
            Outcome::Handled(code) => code,
            Outcome::NotHandled => ResultCode::Success,
        }
    }

    fn status(device: &CdAudio, item: StatusItem) -> u32 {
        let mut params = Params::Status(StatusParams {
            item: item as u32,
            track: 0,
            ret: 0,
        });
        device.handle_command(DEV, Opcode::Status as u32, CommandFlags::ITEM, Some(&mut params));
        match params {
            Params::Status(p) => p.ret,
            _ => 0,
        }
    }

    fn status_for_track(device: &CdAudio, item: StatusItem, track: u32) -> u32 {
        let mut params = Params::Status(StatusParams {
            item: item as u32,
            track,
            ret: 0,
        });
        let flags = CommandFlags::ITEM | CommandFlags::TRACK;
        device.handle_command(DEV, Opcode::Status as u32, flags, Some(&mut params));
        match params {
            Params::Status(p) => p.ret,
            _ => 0,
        }
    }

    fn mode_name(device: &CdAudio) -> &'static str {
        match ModeCode::from_u32(status(device, StatusItem::Mode)) {
            Some(ModeCode::Stopped) => "stopped",
            Some(ModeCode::Playing) => "playing",
            Some(ModeCode::Paused) => "paused",
            None => "unknown",
        }
    }

    fn print_status(device: &CdAudio) {
        let tracks = status(device, StatusItem::NumberOfTracks);
        println!("Mode:          {}", mode_name(device));
        println!("Media present: {}", status(device, StatusItem::MediaPresent) != 0);
        println!("Tracks:        {}", tracks);
        println!("Current track: {}", status(device, StatusItem::CurrentTrack));
        println!(
            "Total length:  {:.1}s",
            status(device, StatusItem::Length) as f32 / 1000.0
        );
        for track in 2..=tracks {
            let length = status_for_track(device, StatusItem::Length, track);
            if length > 0 {
                println!("  track {:02}: {:>7.1}s", track, length as f32 / 1000.0);
            }
        }
    }

    fn print_caps(device: &CdAudio) {
        let items = [
            (CapItem::CanRecord, "can record"),
            (CapItem::HasAudio, "has audio"),
            (CapItem::HasVideo, "has video"),
            (CapItem::DeviceType, "device type"),
            (CapItem::UsesFiles, "uses files"),
            (CapItem::CompoundDevice, "compound device"),
            (CapItem::CanEject, "can eject"),
            (CapItem::CanPlay, "can play"),
            (CapItem::CanSave, "can save"),
        ];
        for (item, label) in items {
            let mut params = Params::DevCaps(DevCapsParams {
                item: item as u32,
                ret: 0,
            });
            device.handle_command(
                DEV,
                Opcode::GetDevCaps as u32,
                CommandFlags::ITEM,
                Some(&mut params),
            );
            if let Params::DevCaps(p) = params {
                println!("  {:<16} {}", label, p.ret);
            }
        }
    }

    pub fn run() -> anyhow::Result<()> {
        println!("CD-Audio Device Emulation - Interactive Console");
        println!("================================================\n");

        let mut config_file: Option<PathBuf> = None;
        let mut backend_override: Option<BackendChoice> = None;
        let mut assume = false;
        let mut verbose = false;
        let mut root_arg: Option<PathBuf> = None;
        let mut show_help = false;

        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => match args.next() {
                    Some(value) => config_file = Some(PathBuf::from(value)),
                    None => {
                        eprintln!("--config requires a file argument");
                        show_help = true;
                    }
                },
                "--backend" => match args.next().as_deref().and_then(backend_from_str) {
                    Some(choice) => backend_override = Some(choice),
                    None => {
                        eprintln!("--backend requires one of: null, sink, oneshot");
                        show_help = true;
                    }
                },
                "--assume" => assume = true,
                "--verbose" => verbose = true,
                "--help" | "-h" => show_help = true,
                _ if arg.starts_with('-') => {
                    eprintln!("Unknown flag: {}", arg);
                    show_help = true;
                }
                _ => root_arg = Some(PathBuf::from(arg)),
            }
        }

        if show_help {
            usage();
            return Ok(());
        }

        log::set_logger(&LOGGER).ok();
        log::set_max_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        });

        let mut config = match config_file {
            Some(path) => EmuConfig::from_json_file(&path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => EmuConfig::default(),
        };
        if let Some(root) = root_arg {
            config.root_path = root;
        }
        if assume {
            config.discovery = DiscoveryPolicy::assume_default();
        }
        if let Some(backend) = backend_override {
            config.backend = backend;
        } else if config.backend == BackendChoice::Null {
            // The interactive console exists to make noise.
            config.backend = BackendChoice::Sink;
        }

        println!("Root path: {}", config.root_path.display());

        let device = CdAudio::new(config);
        let mut open = Params::Open(OpenParams { device_id: DeviceId(0) });
        let code = handled(device.handle_command(
            DEV,
            Opcode::Open as u32,
            CommandFlags::empty(),
            Some(&mut open),
        ));
        anyhow::ensure!(code.is_success(), "open failed: {:?}", code);

        print_status(&device);
        println!("\nType a command (play, stop, pause, resume, seek, status, caps, format, quit):");

        let stdin = io::stdin();
        loop {
            print!("> ");
            io::stdout().flush().ok();

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let mut words = line.split_whitespace();
            let Some(command) = words.next() else { continue };
            let arg_word = words.next();
            let argument = arg_word.and_then(|w| w.parse::<u32>().ok());

            match command {
                "play" => {
                    let (flags, mut params) = match argument {
                        Some(from) => (
                            CommandFlags::FROM,
                            Params::Play(PlayParams { from, to: 0 }),
                        ),
                        None => (CommandFlags::empty(), Params::Play(PlayParams::default())),
                    };
                    device.handle_command(DEV, Opcode::Play as u32, flags, Some(&mut params));
                    println!("{}", mode_name(&device));
                }
                "stop" => {
                    device.handle_command(DEV, Opcode::Stop as u32, CommandFlags::empty(), None);
                    println!("{}", mode_name(&device));
                }
                "pause" => {
                    device.handle_command(DEV, Opcode::Pause as u32, CommandFlags::empty(), None);
                    println!("{}", mode_name(&device));
                }
                "resume" => {
                    device.handle_command(DEV, Opcode::Resume as u32, CommandFlags::empty(), None);
                    println!("{}", mode_name(&device));
                }
                "seek" => match argument {
                    Some(to) => {
                        let mut params = Params::Seek(SeekParams { to });
                        device.handle_command(
                            DEV,
                            Opcode::Seek as u32,
                            CommandFlags::TO,
                            Some(&mut params),
                        );
                        println!("current track {}", status(&device, StatusItem::CurrentTrack));
                    }
                    None => eprintln!("seek needs a track number"),
                },
                "status" => print_status(&device),
                "caps" => print_caps(&device),
                "format" => {
                    let code = match arg_word {
                        Some("tmsf") => Some(TimeFormat::Tmsf.code()),
                        Some("track") => Some(TimeFormat::TrackIndex.code()),
                        _ => None,
                    };
                    match code {
                        Some(code) => {
                            let mut params = Params::Set(SetParams { time_format: code });
                            device.handle_command(
                                DEV,
                                Opcode::Set as u32,
                                CommandFlags::SET_TIME_FORMAT,
                                Some(&mut params),
                            );
                            println!("time format code {}", status(&device, StatusItem::TimeFormat));
                        }
                        None => eprintln!("format needs `tmsf` or `track`"),
                    }
                }
                "quit" | "q" => break,
                _ => eprintln!("Unknown command: {}", command),
            }
        }

        device.handle_command(DEV, Opcode::Close as u32, CommandFlags::empty(), None);
        println!("Device closed.");
        Ok(())
    }
}

#[cfg(feature = "playback")]
fn main() -> anyhow::Result<()> {
    cli::run()
}
