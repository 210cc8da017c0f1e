//! Built-in song library: a fixed, cyclically-selectable set of byte-coded
//! tracks, modeled on the source's `songs.c` (there, a `struct song { data,
//! name }` array built once at startup from flash-resident blobs; here, a
//! `'static` slice of `(name, data)` pairs needing no init step at all).

pub struct Song {
    pub name: &'static str,
    pub data: &'static [u8],
}

// Step values are 16-bit phase increments; at a 40kHz tick rate, a voice's
// audible pitch is `step * 40_000 / 65536` Hz. Chosen by ear against small
// integer ratios rather than tuned to any real pitch table.
const FANFARE: &[u8] = &[
    0x00, 0xE0, // mark repeat at the very start
    0x00, 0x30, 0x80, // pulse A: 50% duty
    0x00, 0x00, 0x00, 0x0C, // pulse A: step <- 0x0C00
    0x00, 0x10, 0x30, // pulse A: volume <- 0x30
    0x3C, 0x00, 0x10, 0x0F, // +60 frames: step <- 0x0F10
    0x3C, 0x00, 0x14, 0x0F, // +60 frames: step <- 0x0F14
    0x78, 0x10, 0x00, // +120 frames: volume <- 0 (fade out)
    0x3C, 0xF0, // +60 frames: loop back to the start
];

const DRONE: &[u8] = &[
    0x00, 0xE0, // mark repeat at the very start
    0x00, 0x02, 0x00, 0x08, // triangle: step <- 0x0800
    0x00, 0x12, 0x20, // triangle: volume <- 0x20
    0x00, 0x01, 0x00, 0x0C, // pulse B: step <- 0x0C00
    0x00, 0x11, 0x18, // pulse B: volume <- 0x18
    0xFF, 0xF0, // long delay, then loop (0xFF is the cursor's own OOB sentinel, never reached here)
];

const PERCUSSION: &[u8] = &[
    0x00, 0xE0, // mark repeat
    0x00, 0x40, 0x00, // noise: short-period mode
    0x00, 0x03, 0x00, 0x40, // noise: step <- 0x4000
    0x00, 0x13, 0x20, // noise: volume <- 0x20
    0x04, 0x13, 0x00, // +4 frames: volume <- 0 (short tick)
    0x1C, 0xF0, // +28 frames: loop (32-frame bar at 60Hz)
];

const SONGS: &[Song] = &[
    Song { name: "Fanfare", data: FANFARE },
    Song { name: "Drone", data: DRONE },
    Song { name: "Percussion", data: PERCUSSION },
];

/// Cyclic index into [`SONGS`], mirroring the source's file-scope
/// `song_idx`.
pub struct Library {
    index: usize,
}

impl Library {
    pub fn new() -> Self {
        Library { index: 0 }
    }

    pub fn at(index: usize) -> Self {
        Library {
            index: index % SONGS.len(),
        }
    }

    pub fn current(&self) -> &'static Song {
        &SONGS[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) -> &'static Song {
        self.index = (self.index + 1) % SONGS.len();
        self.current()
    }

    pub fn prev(&mut self) -> &'static Song {
        self.index = if self.index == 0 { SONGS.len() - 1 } else { self.index - 1 };
        self.current()
    }
}
