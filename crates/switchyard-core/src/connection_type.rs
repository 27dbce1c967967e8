//! Signal-type flags carried by connections and tracked by switchers.
//!
//! A [`ConnectionType`] is a set of single-channel flags. Callers may request
//! several flags at once (audio + video for one logical route), but every
//! routed or claimed fact is stored per single flag: audio and video for the
//! same route regularly take different physical paths. Use
//! [`singles()`](ConnectionType::singles) to fan a request out.

use core::fmt;
use core::str::FromStr;

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// Bit-flag set of signal kinds a connector or connection carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    pub struct ConnectionType: u32 {
        /// Audio channel.
        const AUDIO = 1;
        /// Video channel.
        const VIDEO = 1 << 1;
        /// USB channel (KVM extension, touch panels, cameras).
        const USB = 1 << 2;
    }
}

/// Errors produced when a connection type does not meet a precondition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionTypeError {
    /// The type has no flags set where at least one is required.
    #[error("connection type is empty")]
    Empty,

    /// The type has more than one flag set where exactly one is required.
    #[error("expected a single connection type flag, got {0}")]
    NotSingle(ConnectionType),

    /// A flag name could not be parsed.
    #[error("unknown connection type '{0}'")]
    UnknownName(String),
}

impl ConnectionType {
    /// Every flag, in bit order.
    pub const SINGLES: [ConnectionType; 3] =
        [ConnectionType::AUDIO, ConnectionType::VIDEO, ConnectionType::USB];

    /// Decomposes the set into its single-flag members, lowest bit first.
    ///
    /// Unknown bits are dropped.
    pub fn singles(self) -> impl Iterator<Item = ConnectionType> {
        Self::SINGLES.into_iter().filter(move |flag| self.contains(*flag))
    }

    /// Returns true if exactly one flag is set.
    #[inline]
    pub fn is_single(self) -> bool {
        self.bits().count_ones() == 1 && Self::all().contains(self)
    }

    /// Returns `self` if exactly one flag is set.
    pub fn require_single(self) -> Result<Self, ConnectionTypeError> {
        if self.is_empty() {
            Err(ConnectionTypeError::Empty)
        } else if self.is_single() {
            Ok(self)
        } else {
            Err(ConnectionTypeError::NotSingle(self))
        }
    }

    /// Human-readable name of a single flag.
    ///
    /// Returns `None` for empty or combined values.
    pub const fn flag_name(self) -> Option<&'static str> {
        match self.bits() {
            1 => Some("Audio"),
            2 => Some("Video"),
            4 => Some("Usb"),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        let mut first = true;
        for flag in self.singles() {
            if !first {
                f.write_str("|")?;
            }
            first = false;
            // singles() only yields named flags
            f.write_str(flag.flag_name().unwrap_or("?"))?;
        }
        Ok(())
    }
}

impl FromStr for ConnectionType {
    type Err = ConnectionTypeError;

    /// Parses names such as `video`, `audio,video` or `Audio|Video`.
    ///
    /// `none` parses to the empty set and `all` to every flag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut result = ConnectionType::empty();
        for part in s.split([',', '|']) {
            let name = part.trim();
            let flag = match name.to_ascii_lowercase().as_str() {
                "audio" => ConnectionType::AUDIO,
                "video" => ConnectionType::VIDEO,
                "usb" => ConnectionType::USB,
                "all" => ConnectionType::all(),
                "none" | "" => ConnectionType::empty(),
                _ => return Err(ConnectionTypeError::UnknownName(name.to_string())),
            };
            result |= flag;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singles_decomposes_in_bit_order() {
        let av = ConnectionType::VIDEO | ConnectionType::AUDIO;
        let singles: Vec<_> = av.singles().collect();
        assert_eq!(singles, vec![ConnectionType::AUDIO, ConnectionType::VIDEO]);
    }

    #[test]
    fn singles_of_empty_is_empty() {
        assert_eq!(ConnectionType::empty().singles().count(), 0);
    }

    #[test]
    fn require_single() {
        assert_eq!(
            ConnectionType::VIDEO.require_single(),
            Ok(ConnectionType::VIDEO)
        );
        assert_eq!(
            ConnectionType::empty().require_single(),
            Err(ConnectionTypeError::Empty)
        );
        let av = ConnectionType::AUDIO | ConnectionType::VIDEO;
        assert_eq!(av.require_single(), Err(ConnectionTypeError::NotSingle(av)));
    }

    #[test]
    fn display_joins_flag_names() {
        assert_eq!(ConnectionType::empty().to_string(), "None");
        assert_eq!(ConnectionType::USB.to_string(), "Usb");
        assert_eq!(
            (ConnectionType::AUDIO | ConnectionType::VIDEO).to_string(),
            "Audio|Video"
        );
    }

    #[test]
    fn parse_names() {
        assert_eq!("video".parse(), Ok(ConnectionType::VIDEO));
        assert_eq!(
            "Audio, VIDEO".parse(),
            Ok(ConnectionType::AUDIO | ConnectionType::VIDEO)
        );
        assert_eq!("audio|usb".parse(), Ok(ConnectionType::AUDIO | ConnectionType::USB));
        assert_eq!("all".parse(), Ok(ConnectionType::all()));
        assert_eq!("none".parse(), Ok(ConnectionType::empty()));
        assert_eq!(
            "hdmi".parse::<ConnectionType>(),
            Err(ConnectionTypeError::UnknownName("hdmi".to_string()))
        );
    }

    #[test]
    fn display_parse_agree() {
        for bits in 0..8 {
            let ty = ConnectionType::from_bits_truncate(bits);
            assert_eq!(ty.to_string().parse::<ConnectionType>(), Ok(ty));
        }
    }
}
