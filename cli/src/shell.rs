use std::io::{self, BufRead, Write};

use habit_core::{HabitController, Transport};
use tracing::debug;

use crate::command::{self, Command, HELP};
use crate::terminal::Terminal;

type Shell<T, R, W> = HabitController<T, Terminal<R, W>>;

/// Present the view, then execute commands until `quit` or end of input.
pub fn run<T, R, W>(controller: &mut Shell<T, R, W>) -> io::Result<()>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    controller.present();
    redraw(controller)?;

    while let Some(line) = controller.prompt_mut().next_line()? {
        let command = match command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                controller.prompt_mut().say(&message)?;
                continue;
            }
        };
        debug!(?command, "dispatching");

        match command {
            Command::Add { frequency, name } => {
                if let Some(frequency) = frequency {
                    controller.set_form_frequency(frequency);
                }
                controller.set_form_name(name);
                controller.submit_form();
            }
            Command::Done(id) => controller.complete(id),
            Command::Remove(id) => controller.delete(id),
            Command::Refresh => controller.refresh(),
            Command::Help => controller.prompt_mut().say(HELP)?,
            Command::Quit => break,
        }
        redraw(controller)?;
    }
    Ok(())
}

fn redraw<T, R, W>(controller: &mut Shell<T, R, W>) -> io::Result<()>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    let view = controller.render();
    controller.prompt_mut().show(&view)
}
