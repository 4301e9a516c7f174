//! Command Dispatch
//!
//! [`CdAudio`] is the public entry point: one emulated device, at most one
//! open session, every handler serialized behind a single lock. Commands
//! the device does not recognize, and commands addressed to a different
//! device id, are reported unhandled so a host router can fall through to
//! its default handler.

use crate::backend::{NullBackend, PlaybackBackend};
use crate::catalog::{FileProbe, FsProbe};
use crate::command::{
    time_format_from_raw, CapItem, CommandFlags, Opcode, Params, ResultCode, StatusItem,
    DEVTYPE_CD_AUDIO, TRACK_TYPE_AUDIO,
};
use crate::config::{BackendChoice, EmuConfig};
use crate::session::{DeviceId, DeviceSession};
use crate::tmsf::{decode_position, encode_position};
use log::{debug, trace};
use num_traits::FromPrimitive;
use parking_lot::Mutex;

/// Whether a command was ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command was ours; here is its result code.
    Handled(ResultCode),
    /// Not addressed to this device, or not in its vocabulary. The host
    /// should try its other handlers.
    NotHandled,
}

type BackendFactory = Box<dyn Fn(BackendChoice) -> Box<dyn PlaybackBackend> + Send + Sync>;

/// Build the stock backend for a configuration choice.
///
/// Without the `playback` feature every choice degrades to the silent
/// backend; command handling stays fully functional, nothing is audible.
fn stock_backend(choice: BackendChoice) -> Box<dyn PlaybackBackend> {
    match choice {
        BackendChoice::Null => Box::new(NullBackend::new()),
        #[cfg(feature = "playback")]
        BackendChoice::Sink => Box::new(crate::playback::SinkBackend::new()),
        #[cfg(feature = "playback")]
        BackendChoice::OneShot => Box::new(crate::playback::OneShotBackend::new()),
        #[cfg(not(feature = "playback"))]
        BackendChoice::Sink | BackendChoice::OneShot => {
            debug!("built without the playback feature, rendering silently");
            Box::new(NullBackend::new())
        }
    }
}

/// One emulated CD-audio device.
///
/// Collaborators (filesystem probe, playback backend) are injected, so
/// independent instances can coexist and tests can run against fakes.
/// Dropping the device force-stops any playback.
pub struct CdAudio {
    config: EmuConfig,
    probe: Box<dyn FileProbe>,
    backend_factory: BackendFactory,
    session: Mutex<Option<DeviceSession>>,
}

impl CdAudio {
    /// A device with the real filesystem probe and the stock backends.
    pub fn new(config: EmuConfig) -> Self {
        Self::with_collaborators(config, Box::new(FsProbe), Box::new(stock_backend))
    }

    /// A device with injected collaborators.
    pub fn with_collaborators(
        config: EmuConfig,
        probe: Box<dyn FileProbe>,
        backend_factory: BackendFactory,
    ) -> Self {
        CdAudio {
            config,
            probe,
            backend_factory,
            session: Mutex::new(None),
        }
    }

    /// Whether a session is currently open.
    pub fn is_open(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Handle one command message.
    ///
    /// Every opcode except Open requires `device_id` to match the open
    /// session; otherwise the command is not ours. All handlers return
    /// before playback makes a sound.
    pub fn handle_command(
        &self,
        device_id: DeviceId,
        msg: u32,
        flags: CommandFlags,
        mut params: Option<&mut Params>,
    ) -> Outcome {
        let Some(opcode) = Opcode::from_u32(msg) else {
            trace!("message {:#06x} is not in the vocabulary", msg);
            return Outcome::NotHandled;
        };

        let mut session = self.session.lock();

        if opcode != Opcode::Open {
            match session.as_ref() {
                Some(s) if s.device_id() == device_id => {}
                _ => return Outcome::NotHandled,
            }
        }

        trace!("handling {:?} for device {:?}", opcode, device_id);

        let code = match opcode {
            Opcode::Open => self.handle_open(&mut session, device_id, params.as_deref_mut()),
            Opcode::Close => {
                if let Some(s) = session.as_mut() {
                    s.shutdown();
                }
                *session = None;
                ResultCode::Success
            }
            // The host's default handler describes the device.
            Opcode::Info => return Outcome::NotHandled,
            _ => {
                let Some(s) = session.as_mut() else {
                    return Outcome::NotHandled;
                };
                match opcode {
                    Opcode::Play => {
                        handle_play(s, flags, params.as_deref());
                        ResultCode::Success
                    }
                    Opcode::Stop => {
                        s.stop();
                        ResultCode::Success
                    }
                    Opcode::Pause => {
                        s.pause();
                        ResultCode::Success
                    }
                    Opcode::Resume => {
                        s.resume();
                        ResultCode::Success
                    }
                    Opcode::Seek => {
                        handle_seek(s, flags, params.as_deref());
                        ResultCode::Success
                    }
                    Opcode::Status => handle_status(s, flags, params),
                    Opcode::Set => handle_set(s, flags, params),
                    Opcode::GetDevCaps => handle_devcaps(flags, params),
                    Opcode::Open | Opcode::Close | Opcode::Info => unreachable!(),
                }
            }
        };

        Outcome::Handled(code)
    }

    fn handle_open(
        &self,
        session: &mut Option<DeviceSession>,
        device_id: DeviceId,
        params: Option<&mut Params>,
    ) -> ResultCode {
        if session.is_some() {
            debug!("open rejected, a session is already open");
            return ResultCode::DeviceAlreadyOpen;
        }

        let backend = (self.backend_factory)(self.config.backend);
        *session = Some(DeviceSession::open(
            device_id,
            &self.config,
            self.probe.as_ref(),
            backend,
        ));

        if let Some(Params::Open(p)) = params {
            p.device_id = device_id;
        }
        ResultCode::Success
    }
}

impl Drop for CdAudio {
    fn drop(&mut self) {
        if let Some(s) = self.session.lock().as_mut() {
            s.shutdown();
        }
    }
}

fn handle_play(session: &mut DeviceSession, flags: CommandFlags, params: Option<&Params>) {
    let format = session.time_format();
    let mut from = session.current_track();
    let mut to = session.catalog().num_tracks();

    if let Some(Params::Play(p)) = params {
        if flags.contains(CommandFlags::FROM) {
            from = decode_position(format, p.from);
        }
        if flags.contains(CommandFlags::TO) {
            to = decode_position(format, p.to);
        }
    }

    debug!("play from track {} to {}", from, to);
    session.play(from, to);
}

fn handle_seek(session: &mut DeviceSession, flags: CommandFlags, params: Option<&Params>) {
    if !flags.contains(CommandFlags::TO) {
        return;
    }
    if let Some(Params::Seek(p)) = params {
        let track = decode_position(session.time_format(), p.to);
        session.seek(track);
    }
}

fn handle_status(
    session: &mut DeviceSession,
    flags: CommandFlags,
    params: Option<&mut Params>,
) -> ResultCode {
    let Some(Params::Status(p)) = params else {
        return ResultCode::NullParameterBlock;
    };

    if !flags.contains(CommandFlags::ITEM) {
        return ResultCode::Success;
    }

    let format = session.time_format();
    let catalog = session.catalog();

    p.ret = match StatusItem::from_u32(p.item) {
        Some(StatusItem::Length) => {
            if flags.contains(CommandFlags::TRACK) {
                // Absent tracks (and out-of-range requests) answer 0.
                let track = u8::try_from(p.track).unwrap_or(0);
                catalog.length_ms(track)
            } else {
                catalog.total_length_ms()
            }
        }
        Some(StatusItem::Position) => {
            if flags.contains(CommandFlags::TRACK) {
                encode_position(format, u8::try_from(p.track).unwrap_or(0))
            } else {
                encode_position(format, session.current_track())
            }
        }
        Some(StatusItem::NumberOfTracks) => catalog.num_tracks() as u32,
        Some(StatusItem::Mode) => session.mode() as u32,
        Some(StatusItem::MediaPresent) => catalog.media_present() as u32,
        Some(StatusItem::TimeFormat) => format.code(),
        Some(StatusItem::Ready) => 1,
        Some(StatusItem::CurrentTrack) => session.current_track() as u32,
        Some(StatusItem::TypeTrack) => TRACK_TYPE_AUDIO,
        None => {
            debug!("unknown status item {}", p.item);
            0
        }
    };

    ResultCode::Success
}

fn handle_set(
    session: &mut DeviceSession,
    flags: CommandFlags,
    params: Option<&mut Params>,
) -> ResultCode {
    let Some(Params::Set(p)) = params else {
        return ResultCode::NullParameterBlock;
    };

    if flags.contains(CommandFlags::SET_TIME_FORMAT) {
        let format = time_format_from_raw(p.time_format);
        debug!("time format set to {:?}", format);
        session.set_time_format(format);
    }
    ResultCode::Success
}

fn handle_devcaps(flags: CommandFlags, params: Option<&mut Params>) -> ResultCode {
    let Some(Params::DevCaps(p)) = params else {
        return ResultCode::NullParameterBlock;
    };

    if !flags.contains(CommandFlags::ITEM) {
        return ResultCode::Success;
    }

    p.ret = match CapItem::from_u32(p.item) {
        Some(CapItem::CanRecord) => 0,
        Some(CapItem::HasAudio) => 1,
        Some(CapItem::HasVideo) => 0,
        Some(CapItem::DeviceType) => DEVTYPE_CD_AUDIO,
        Some(CapItem::UsesFiles) => 0,
        Some(CapItem::CompoundDevice) => 0,
        Some(CapItem::CanEject) => 0,
        Some(CapItem::CanPlay) => 1,
        Some(CapItem::CanSave) => 0,
        None => {
            debug!("unknown capability item {}", p.item);
            0
        }
    };

    ResultCode::Success
}
