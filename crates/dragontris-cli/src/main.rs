mod command;
mod input;
mod logging;
mod results;
mod tui;
mod view;

fn main() -> anyhow::Result<()> {
    command::run()
}
