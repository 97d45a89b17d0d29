//! Terminal Demo - a clickable grid in the terminal
//!
//! Left-click the counter to add one, right-click to take one away.
//! Hover a cell and press 1-9 to see hotbar clicks logged in the footer.
//! Esc closes the window; the close is canceled once so the grid reopens.
//!
//! Run with: cargo run --example terminal

use std::cell::Cell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use cellgraph::terminal::{EventTranslator, Frame, TerminalEvent, TerminalHost, TerminalSession, poll_event};
use cellgraph::{
    Background, Cancelable, CloseReason, Display, DisplayKind, ItemBuilder, Node, Orientation,
    Pixel, Scene, StaticLore, TaskQueue,
};
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;

const FOOTER_ROW: u16 = 6;

fn counter_pixel(count: i32) -> Pixel {
    Pixel::of("counter")
        .with_count(count)
        .with_glow(count >= 10)
        .with_lore(StaticLore::new(["Left: +1", "Right: -1"]))
}

fn main() -> io::Result<()> {
    let _session = TerminalSession::enter()?;

    let host = TerminalHost::new();
    host.set_origin(2, 1);
    let tasks = TaskQueue::new();
    let display = Display::new(DisplayKind::Chest { rows: 3 }, "cellgraph demo", Rc::new(host.clone()), tasks.clone())
        .map_err(io::Error::other)?;

    let count = Rc::new(Cell::new(1));
    let counter = {
        let up = count.clone();
        let down = count.clone();
        ItemBuilder::new(counter_pixel(1))
            .id("counter")
            .on_left_click(move |ctx| {
                up.set((up.get() + 1).min(64));
                ctx.target.set_pixel(counter_pixel(up.get()));
                if let Some(display) = &ctx.display {
                    display.request_render(true);
                }
            })
            .on_right_click(move |ctx| {
                down.set((down.get() - 1).max(1));
                ctx.target.set_pixel(counter_pixel(down.get()));
                if let Some(display) = &ctx.display {
                    display.request_render(true);
                }
            })
            .build()
    };

    let shelf = Node::flow(Orientation::Horizontal, 1, 1);
    shelf.resize(9, 3);
    for content in ["apple", "bread", "carrot", "diamond", "emerald", "feather"] {
        shelf.add_child(Node::item(Pixel::of(content))).map_err(io::Error::other)?;
    }
    shelf.add_child(counter).map_err(io::Error::other)?;

    let scene = Scene::with_root(shelf);
    scene.set_background(Some(Background::checkerboard(Pixel::blank("pane"), Pixel::empty())));
    display.set_scene(Some(scene));

    let canceled_once = Rc::new(Cell::new(false));
    let quit = Rc::new(Cell::new(false));
    {
        let canceled_once = canceled_once.clone();
        let quit = quit.clone();
        display.on_close(move |ctx| {
            if !canceled_once.replace(true) {
                ctx.cancel();
            } else {
                quit.set(true);
            }
        });
    }

    display.on_slot_click(|ctx| {
        let mut out = io::stdout();
        let line = format!("{:?} at ({}, {})        ", ctx.kind, ctx.slot_x, ctx.slot_y);
        queue!(out, MoveTo(2, FOOTER_ROW), Print(line))?;
        out.flush()
    });

    let viewer = host.viewer();
    display.show(viewer);
    let mut input = EventTranslator::new(viewer, host.frame().unwrap_or(Frame::new(2, 1, 9, 3)));

    while !quit.get() {
        if let Some(event) = poll_event(Duration::from_millis(50))? {
            if let Some(frame) = host.frame() {
                input.set_frame(frame);
            }
            match input.translate(event) {
                TerminalEvent::Click(click) => display.handle_click(click),
                TerminalEvent::Close => {
                    display.close(viewer);
                    display.handle_close(viewer, CloseReason::Viewer);
                }
                TerminalEvent::Resize(..) | TerminalEvent::None => {}
            }
        }
        tasks.run_pending();
    }

    Ok(())
}
