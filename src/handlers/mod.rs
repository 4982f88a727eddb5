// Handlers module

pub mod conversations;
pub mod grammar;
pub mod health;
pub mod search;

pub use conversations::{
    delete_conversation_handler, end_conversation_handler, get_conversation_handler,
    get_messages_handler, list_conversations_handler, send_message_handler,
    start_conversation_handler,
};
pub use grammar::{
    check_grammar_handler, get_feedback_handler, stats_handler, stream_feedback_handler,
};
pub use health::{health_handler, root_handler};
pub use search::search_handler;
