
use std::collections::VecDeque;
use std::io::{self, stdout, Write};
use std::sync::Mutex;
use std::time::Duration;

use crate::io::Cancel;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;

pub trait Tty: Send + Sync {
    // Unbuffered; the byte is visible once this returns.
    fn handle_output(&self, val: u8) -> io::Result<()>;

    // Never blocks.
    fn input_available(&self) -> io::Result<bool>;

    // Blocks until a character arrives.
    fn read_input(&self) -> io::Result<u8>;

    // Never blocks.
    fn poll_input(&self) -> io::Result<Option<u8>> {
        if self.input_available()? {
            self.read_input().map(Some)
        } else {
            Ok(None)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

enum Key {
    Char(u8),
    Interrupt,
}

impl Key {
    fn from_event(event: Event) -> Option<Key> {
        let Event::Key(KeyEvent{code, modifiers, kind, ..}) = event else {
            return None;
        };
        if kind == KeyEventKind::Release {
            return None;
        }

        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let ch = match code {
            KeyCode::Char('c') if ctrl => return Some(Key::Interrupt),
            KeyCode::Char(c) if ctrl && c.is_ascii_alphabetic() => (c.to_ascii_lowercase() as u8) & 0x1f,
            KeyCode::Char(c) if c.is_ascii() => c as u8,
            KeyCode::Enter => b'\n',
            KeyCode::Tab => b'\t',
            KeyCode::Backspace => 0x08,
            KeyCode::Esc => 0x1b,
            _ => return None,
        };
        Some(Key::Char(ch))
    }
}

fn interrupted() -> io::Error {
    io::Error::new(io::ErrorKind::Interrupted, "interrupted from keyboard")
}

// The controlling terminal, read through crossterm's event queue. In raw mode
// ^C doesn't raise SIGINT, so it's turned into a cancel request here.
pub struct StdIo {
    pending: Mutex<VecDeque<u8>>,
    cancel: Cancel,
}

impl StdIo {
    pub fn new(cancel: Cancel) -> Self {
        StdIo {
            pending: Mutex::new(VecDeque::new()),
            cancel,
        }
    }

    fn interrupt(&self) -> io::Error {
        debug!("StdIo: ^C, cancelling");
        self.cancel.cancel();
        interrupted()
    }
}

impl Tty for StdIo {
    fn handle_output(&self, val: u8) -> io::Result<()> {
        let mut out = stdout().lock();
        // Raw mode turns off output post-processing.
        if val == b'\n' {
            out.write_all(b"\r\n")?;
        } else {
            out.write_all(&[val])?;
        }
        out.flush()
    }

    fn input_available(&self) -> io::Result<bool> {
        let mut pending = self.pending.lock().unwrap();
        if !pending.is_empty() {
            return Ok(true);
        }

        while event::poll(Duration::ZERO)? {
            match Key::from_event(event::read()?) {
                Some(Key::Char(ch)) => {
                    pending.push_back(ch);
                    return Ok(true);
                },
                Some(Key::Interrupt) => return Err(self.interrupt()),
                None => (),
            }
        }
        Ok(false)
    }

    fn read_input(&self) -> io::Result<u8> {
        if let Some(ch) = self.pending.lock().unwrap().pop_front() {
            return Ok(ch);
        }

        loop {
            match Key::from_event(event::read()?) {
                Some(Key::Char(ch)) => return Ok(ch),
                Some(Key::Interrupt) => return Err(self.interrupt()),
                None => (),
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

// In-memory terminal. Reading with nothing queued fails instead of blocking.
#[derive(Default)]
pub struct PipeTty {
    out_buf: Mutex<VecDeque<u8>>,
    in_buf: Mutex<VecDeque<u8>>,
}

impl PipeTty {
    pub fn take_output(&self) -> VecDeque<u8> {
        std::mem::take(&mut self.out_buf.lock().unwrap())
    }

    pub fn output_string(&self) -> String {
        let buf: Vec<u8> = self.take_output().into();
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn is_out_empty(&self) -> bool {
        self.out_buf.lock().unwrap().is_empty()
    }

    pub fn push_input(&self, val: u8) {
        self.in_buf.lock().unwrap().push_back(val);
    }

    pub fn write_input(&self, vals: &[u8]) {
        for val in vals.iter() {
            self.push_input(*val);
        }
    }

    pub fn pending_input(&self) -> usize {
        self.in_buf.lock().unwrap().len()
    }
}

impl Tty for PipeTty {
    fn handle_output(&self, val: u8) -> io::Result<()> {
        self.out_buf.lock().unwrap().push_back(val);
        Ok(())
    }

    fn input_available(&self) -> io::Result<bool> {
        Ok(!self.in_buf.lock().unwrap().is_empty())
    }

    fn read_input(&self) -> io::Result<u8> {
        self.in_buf.lock().unwrap().pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no input queued")
        })
    }
}
