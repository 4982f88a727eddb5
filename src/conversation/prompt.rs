//! System prompt construction for the two conversation modes

use crate::store::types::ConversationType;

/// Build the system prompt for a conversation
///
/// `search_context` is only supplied on the first turn; it carries shaped
/// web-search results the assistant should weave into the conversation.
pub fn build_system_prompt(
    search_context: Option<&str>,
    conversation_type: ConversationType,
    role_character: Option<&str>,
) -> String {
    match conversation_type {
        ConversationType::RolePlaying => {
            build_roleplay_prompt(role_character.unwrap_or("English Teacher"), search_context)
        }
        ConversationType::FreeChat => build_free_chat_prompt(search_context),
    }
}

/// System prompt for role-playing conversations
pub fn build_roleplay_prompt(role_character: &str, search_context: Option<&str>) -> String {
    let mut prompt = format!(
        r#"You are an English conversation practice partner playing the role of '{role_character}'.

## Role Guidelines:
1. Always speak naturally from the perspective of '{role_character}'
2. Use vocabulary and expressions appropriate for this role
3. Lead the conversation immersively as if in a real situation

## Conversation Rules:
- Continue the conversation with natural questions appropriate to the situation
- Create realistic scenarios that fit the role
- **IMPORTANT: Keep responses short - maximum 3 sentences**

## Scenario Examples:
- Cafe Barista: Greeting customers, explaining and recommending menu items, taking orders, chatting during drink preparation, payment and closing
- Interviewer: Welcoming candidates, requesting self-introduction, asking about experience and career, evaluating problem-solving skills in various situations, providing time for questions
- English Teacher: Practicing daily conversation, introducing new expressions, explaining grammar, correcting pronunciation, reviewing homework and providing feedback
- Hotel Front Desk: Check-in procedures, room information, introducing hotel facilities, handling requests, check-out and feedback"#
    );

    if let Some(context) = search_context {
        prompt.push_str(&format!("\n\n## Reference Information:\n{}", context));
    }

    prompt
}

/// System prompt for free-chat conversations
pub fn build_free_chat_prompt(search_context: Option<&str>) -> String {
    let mut prompt = r#"You are a friendly and helpful English conversation learning assistant.

## Role:
- Help users learn by having natural English conversations
- Answer questions about grammar and expressions
- Teach practical English expressions

## Conversation Style:
- Always communicate in English only
- Actively utilize reference information when available
- Use natural and fluent English expressions
- Proceed like a real conversation
- **IMPORTANT: Keep responses very short - maximum 3 sentences**"#
        .to_string();

    if let Some(context) = search_context {
        prompt.push_str(&format!("\n\n## Reference Information:\n{}", context));
    }

    prompt
}

/// Conversation title derived from the first message, capped at 50 characters
pub fn title_from_first_message(first_message: &str) -> String {
    if first_message.chars().count() <= 50 {
        first_message.to_string()
    } else {
        let truncated: String = first_message.chars().take(47).collect();
        format!("{}...", truncated)
    }
}
