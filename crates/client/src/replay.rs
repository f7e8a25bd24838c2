use std::io::{self, BufRead, Write};

use serde::Deserialize;

use mirra::{HostEvent, Intent};

use crate::game::Session;
use crate::scene::RegistryStats;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("replay I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode intent: {0}")]
    Encode(#[source] serde_json::Error),
}

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplayLine {
    Frames { frames: u32 },
    Key(KeyLine),
    Host(HostEvent),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyLine {
    pub key: char,
    #[serde(default = "default_pressed")]
    pub pressed: bool,
    #[serde(default)]
    pub repeat: bool,
}

fn default_pressed() -> bool {
    true
}

#[derive(Debug, Clone, Default)]
pub struct ReplaySummary {
    pub lines: usize,
    pub frames: u64,
    pub intents: Vec<Intent>,
    pub stats: RegistryStats,
    pub proxies: usize,
}

/// Feeds a newline-delimited JSON script through a session.
///
/// Every host event is followed by `frames_per_event` frames. Emitted intents
/// are written to `out` as JSON lines, the way the page bridge would see them.
pub fn run_replay(
    session: &mut Session,
    input: impl BufRead,
    frames_per_event: u32,
    mut out: impl Write,
) -> Result<ReplaySummary, ReplayError> {
    let mut summary = ReplaySummary::default();

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parsed: ReplayLine =
            serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse {
                line: index + 1,
                source,
            })?;
        summary.lines += 1;

        let frames = match parsed {
            ReplayLine::Frames { frames } => frames,
            ReplayLine::Key(key) => {
                if key.pressed {
                    session.key_down(key.key, key.repeat);
                } else {
                    session.key_up(key.key);
                }
                0
            }
            ReplayLine::Host(event) => {
                session.handle_host_event(event);
                frames_per_event
            }
        };

        for _ in 0..frames {
            session.frame();
        }
        summary.frames += u64::from(frames);

        for intent in session.drain_intents() {
            writeln!(out, "{}", intent.to_json().map_err(ReplayError::Encode)?)?;
            summary.intents.push(intent);
        }
    }

    summary.stats = session.registry().stats();
    summary.proxies = session.registry().len();
    log::info!(
        "Replayed {} lines: {} frames, {} intents, {} proxies live",
        summary.lines,
        summary.frames,
        summary.intents.len(),
        summary.proxies
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_line_kind() {
        let line: ReplayLine = serde_json::from_str(r#"{"frames": 5}"#).unwrap();
        assert_eq!(line, ReplayLine::Frames { frames: 5 });

        let line: ReplayLine = serde_json::from_str(r#"{"key": "w"}"#).unwrap();
        assert_eq!(
            line,
            ReplayLine::Key(KeyLine {
                key: 'w',
                pressed: true,
                repeat: false,
            })
        );

        let line: ReplayLine =
            serde_json::from_str(r#"{"event": "debug_mode_toggled", "enabled": true}"#).unwrap();
        assert_eq!(
            line,
            ReplayLine::Host(HostEvent::DebugModeToggled {
                enabled: Some(true)
            })
        );
    }
}
