//! Requests raised by interactive components and carried out by the scene.
//!
//! Markers and popup buttons only hold a [`CommandSender`]; the scene drains
//! the queue after input and on every frame.

use crossbeam_channel::{Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideCommand {
    /// Open the detail popup of the landmark at this registry index.
    ShowLandmark(usize),
    ClosePopup,
    /// Directions to a street address, preferring the maps app.
    OpenDirections(String),
    OpenUrl(String),
}

pub type CommandSender = Sender<GuideCommand>;
pub type CommandReceiver = Receiver<GuideCommand>;

pub fn command_channel() -> (CommandSender, CommandReceiver) {
    crossbeam_channel::unbounded()
}

/// Callback that sends `command` each time it runs.
pub fn send_on_release(
    sender: &CommandSender,
    command: GuideCommand,
) -> impl FnMut() + Send + 'static {
    let sender = sender.clone();
    move || {
        if sender.send(command.clone()).is_err() {
            log::warn!("command {:?} dropped: receiver is gone", command);
        }
    }
}
