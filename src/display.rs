// Operator-visible status text (startup progress and fatal errors)

use tracing::info;

pub trait StatusDisplay {
    fn append_line(&mut self, line: &str);
}

/// Prints status lines to stdout and mirrors them to the log
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl StatusDisplay for ConsoleDisplay {
    fn append_line(&mut self, line: &str) {
        println!("{}", line);
        info!(target: "status", "{}", line);
    }
}

impl StatusDisplay for Vec<String> {
    fn append_line(&mut self, line: &str) {
        self.push(line.to_owned());
    }
}
