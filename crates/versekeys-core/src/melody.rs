//! Reference melody tables.
//!
//! Note-number sequences for a handful of recognizable melodies, intended
//! as play-along guides for the performer. Pure data; versekeys never
//! sequences these itself (notes are handled purely on arrival).

/// A named reference melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Melody {
    /// Short lookup key (e.g. "rainbow")
    pub key: &'static str,
    /// Human-readable title
    pub name: &'static str,
    /// MIDI note numbers in playing order
    pub notes: &'static [u8],
}

/// Built-in reference melodies.
pub const MELODIES: &[Melody] = &[
    Melody {
        key: "graduation",
        name: "Graduation (Friends Forever)",
        notes: &[
            60, 62, 64, 65, 67, 65, 64, 62, 60, 62, 64, 65, 67, 69, 67, 65, 64, 62, 60,
        ],
    },
    Melody {
        key: "rainbow",
        name: "Somewhere Over the Rainbow",
        notes: &[
            60, 64, 67, 64, 67, 69, 67, 64, 67, 64, 60, 64, 67, 69, 71, 72, 71, 69, 67,
        ],
    },
    Melody {
        key: "falling",
        name: "Can't Help Falling in Love",
        notes: &[
            60, 64, 67, 64, 67, 69, 67, 64, 62, 64, 67, 64, 67, 69, 71, 69, 67,
        ],
    },
    Melody {
        key: "yesterday",
        name: "Yesterday",
        notes: &[64, 62, 60, 62, 64, 67, 65, 64, 62, 60, 62, 64, 65, 64, 62, 60],
    },
    Melody {
        key: "hallelujah",
        name: "Hallelujah",
        notes: &[
            60, 64, 67, 64, 67, 69, 67, 64, 62, 64, 67, 64, 67, 69, 71, 69, 67, 64,
        ],
    },
    Melody {
        key: "imagine",
        name: "Imagine",
        notes: &[
            60, 64, 67, 64, 67, 69, 67, 64, 67, 64, 60, 64, 67, 69, 71, 69, 67, 64,
        ],
    },
];

/// Look up a melody by its short key.
pub fn find(key: &str) -> Option<&'static Melody> {
    MELODIES.iter().find(|m| m.key == key)
}
