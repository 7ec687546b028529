use std::fmt;
use std::str::FromStr;

/// Remote keys the app sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcpKey {
    Up,
    Down,
    Left,
    Right,
    Select,
    Home,
    VolumeUp,
    VolumeDown,
    Power,
}

impl EcpKey {
    pub const ALL: [EcpKey; 9] = [
        EcpKey::Up,
        EcpKey::Down,
        EcpKey::Left,
        EcpKey::Right,
        EcpKey::Select,
        EcpKey::Home,
        EcpKey::VolumeUp,
        EcpKey::VolumeDown,
        EcpKey::Power,
    ];

    /// Name used in the `/keypress/<key>` path.
    pub fn as_str(self) -> &'static str {
        match self {
            EcpKey::Up => "Up",
            EcpKey::Down => "Down",
            EcpKey::Left => "Left",
            EcpKey::Right => "Right",
            EcpKey::Select => "Select",
            EcpKey::Home => "Home",
            EcpKey::VolumeUp => "VolumeUp",
            EcpKey::VolumeDown => "VolumeDown",
            EcpKey::Power => "Power",
        }
    }
}

impl fmt::Display for EcpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown key: {0}")]
pub struct UnknownKey(pub String);

impl FromStr for EcpKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ok") {
            return Ok(EcpKey::Select);
        }
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}
