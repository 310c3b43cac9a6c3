pub mod conversation;
pub mod text;

use conversation::ConversationManager;
use ratatui::Frame;

/// Draw one frame of the chat screen
pub fn draw(frame: &mut Frame, manager: &mut ConversationManager) {
    let area = frame.size();
    manager.render(area, frame.buffer_mut());
}
