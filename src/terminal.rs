// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

#[derive(Default)]
struct Pen {
    fg: Option<Option<Color>>,
    bg: Option<Option<Color>>,
}

impl Pen {
    fn apply(&mut self, out: &mut Stdout, fg: Option<Color>, bg: Option<Color>) -> Result<()> {
        if self.fg != Some(fg) {
            out.queue(SetForegroundColor(fg.unwrap_or(Color::Reset)))?;
            self.fg = Some(fg);
        }
        if self.bg != Some(bg) {
            out.queue(SetBackgroundColor(bg.unwrap_or(Color::Reset)))?;
            self.bg = Some(bg);
        }
        Ok(())
    }
}

pub struct Terminal {
    stdout: Stdout,
    shown: Option<(u16, u16, Vec<Cell>)>,
    run_buf: String,
}

fn leave(out: &mut Stdout) {
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(DisableFocusChange);
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(EnableMouseCapture)?;
            // Not every terminal reports focus; pointer-leave is best effort.
            let _ = out.execute(EnableFocusChange);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            leave(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let len = frame.width as usize * frame.height as usize;
        let same_size = matches!(&self.shown, Some((w, h, _)) if *w == frame.width && *h == frame.height);
        let many_dirty = len > 0 && frame.dirty_indices().len() >= len / 3;

        if !same_size || frame.is_dirty_all() || many_dirty {
            self.redraw_all(frame, !same_size)?;
        } else {
            self.redraw_dirty(frame)?;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn redraw_all(&mut self, frame: &Frame, clear_first: bool) -> Result<()> {
        if clear_first {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }
        let mut pen = Pen::default();
        let mut shown = Vec::with_capacity(frame.width as usize * frame.height as usize);
        for (y, row) in frame.rows().enumerate().take(frame.height as usize) {
            self.stdout.queue(cursor::MoveTo(0, y as u16))?;
            for cell in row {
                pen.apply(&mut self.stdout, cell.fg, cell.bg)?;
                self.stdout.queue(Print(cell.ch))?;
                shown.push(*cell);
            }
        }
        self.shown = Some((frame.width, frame.height, shown));
        Ok(())
    }

    fn redraw_dirty(&mut self, frame: &Frame) -> Result<()> {
        let Some((_, _, shown)) = self.shown.as_mut() else {
            return Ok(());
        };
        let width = frame.width as usize;
        let mut dirty = frame.dirty_indices().to_vec();
        dirty.sort_unstable();

        let mut pen = Pen::default();
        let mut cursor_at: Option<usize> = None;
        let mut i = 0usize;
        while i < dirty.len() {
            let idx0 = dirty[i];
            let cell0 = frame.cell_at_index(idx0);
            if shown[idx0] == cell0 {
                i += 1;
                continue;
            }
            shown[idx0] = cell0;

            self.run_buf.clear();
            self.run_buf.push(cell0.ch);
            let mut end = idx0;
            let mut j = i + 1;
            while j < dirty.len() {
                let idx1 = dirty[j];
                // Runs never wrap onto the next row.
                if idx1 != end + 1 || idx1 % width == 0 {
                    break;
                }
                let cell1 = frame.cell_at_index(idx1);
                if shown[idx1] == cell1 || cell1.fg != cell0.fg || cell1.bg != cell0.bg {
                    break;
                }
                self.run_buf.push(cell1.ch);
                shown[idx1] = cell1;
                end = idx1;
                j += 1;
            }

            if cursor_at != Some(idx0) {
                self.stdout
                    .queue(cursor::MoveTo((idx0 % width) as u16, (idx0 / width) as u16))?;
            }
            pen.apply(&mut self.stdout, cell0.fg, cell0.bg)?;
            self.stdout.queue(Print(self.run_buf.as_str()))?;
            cursor_at = if (end + 1) % width == 0 {
                None
            } else {
                Some(end + 1)
            };
            i = j;
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        leave(&mut self.stdout);
    }
}

pub fn restore_terminal_best_effort() {
    leave(&mut stdout());
}
