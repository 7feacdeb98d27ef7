use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

pub enum Event {
    Input(String),
    Eof,
}

pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    _input_handle: thread::JoinHandle<()>,
}

impl Default for Dispatcher {
    fn default() -> Dispatcher {
        Dispatcher::from_reader(io::stdin())
    }
}

impl Dispatcher {
    /// Forwards every line read from `reader` until it is exhausted.
    pub fn from_reader<R: io::Read + Send + 'static>(reader: R) -> Dispatcher {
        let (tx, rx) = mpsc::channel();
        let input_handle = {
            thread::spawn(move || {
                let reader = io::BufReader::new(reader);
                for line in reader.lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(Event::Input(line)).is_err() {
                                return;
                            }
                        }
                        Err(err) => {
                            log::warn!("Could not read input: {}", err);
                            break;
                        }
                    }
                }
                let _ = tx.send(Event::Eof);
            })
        };

        Dispatcher {
            rx,
            _input_handle: input_handle,
        }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_forwarded_then_eof() {
        let dispatcher = Dispatcher::from_reader(io::Cursor::new("next\nsave\n"));

        assert!(matches!(dispatcher.next(), Ok(Event::Input(line)) if line == "next"));
        assert!(matches!(dispatcher.next(), Ok(Event::Input(line)) if line == "save"));
        assert!(matches!(dispatcher.next(), Ok(Event::Eof)));
    }
}
