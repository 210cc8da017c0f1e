//! Two-line character display, modeling only the content contract the
//! original driver's callers actually relied on (a title line and a status
//! line). The original's `lcdputstr` line-wrap addressing table
//! (16->64->16->80->32->80->96->0) is a quirk of that specific controller
//! chip and is deliberately not reproduced here; this is an in-memory grid
//! rendered straight to the terminal.

const COLUMNS: usize = 20;

pub struct Lcd {
    title: [u8; COLUMNS],
    status: [u8; COLUMNS],
}

impl Lcd {
    pub fn new() -> Self {
        Lcd {
            title: [b' '; COLUMNS],
            status: [b' '; COLUMNS],
        }
    }

    pub fn set_title(&mut self, text: &str) {
        write_line(&mut self.title, text);
    }

    pub fn set_status(&mut self, text: &str) {
        write_line(&mut self.status, text);
    }

    pub fn render(&self) -> String {
        format!(
            "+{pad}+\n|{title}|\n|{status}|\n+{pad}+",
            pad = "-".repeat(COLUMNS),
            title = String::from_utf8_lossy(&self.title),
            status = String::from_utf8_lossy(&self.status),
        )
    }
}

fn write_line(line: &mut [u8; COLUMNS], text: &str) {
    line.fill(b' ');
    for (slot, byte) in line.iter_mut().zip(text.as_bytes()) {
        *slot = *byte;
    }
}
