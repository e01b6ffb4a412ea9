use conversation_store::{Conversation, ConversationStore, Message, Role};

fn store_with_conversation(id: &str, title: &str) -> ConversationStore {
    let mut store = ConversationStore::new();
    store.create_conversation(Conversation::new(id, title));
    store
}

fn active_prompt_count(store: &ConversationStore) -> usize {
    store
        .prompts()
        .iter()
        .filter(|prompt| prompt.is_active)
        .count()
}

#[test]
fn create_prompt_activates_only_the_new_prompt() {
    let mut store = ConversationStore::new();
    let first = store.create_prompt("terse", "Answer in one sentence.");
    let second = store.create_prompt("verbose", "Answer at length.");

    assert_ne!(first, second);
    assert_eq!(active_prompt_count(&store), 1);
    let active = store.active_prompt().expect("one prompt should be active");
    assert_eq!(active.id, second);
    assert_eq!(active.name, "verbose");
}

#[test]
fn set_prompt_active_enforces_single_active_invariant() {
    let mut store = ConversationStore::new();
    let first = store.create_prompt("a", "content a");
    let second = store.create_prompt("b", "content b");

    store.set_prompt_active(&first, true);
    assert_eq!(active_prompt_count(&store), 1);
    assert_eq!(store.active_prompt().map(|p| p.id.clone()), Some(first.clone()));

    store.set_prompt_active(&first, false);
    assert_eq!(active_prompt_count(&store), 0);

    // Deactivating one prompt leaves the others untouched.
    store.set_prompt_active(&second, true);
    store.set_prompt_active(&first, false);
    assert_eq!(store.active_prompt().map(|p| p.id.clone()), Some(second));
}

#[test]
fn set_prompt_active_on_unknown_id_is_a_no_op() {
    let mut store = ConversationStore::new();
    store.create_prompt("a", "content");

    store.set_prompt_active("missing", true);
    assert_eq!(active_prompt_count(&store), 0);
}

#[test]
fn delete_prompt_removes_only_the_named_prompt() {
    let mut store = ConversationStore::new();
    let first = store.create_prompt("a", "content a");
    store.create_prompt("b", "content b");

    store.delete_prompt(&first);
    assert_eq!(store.prompts().len(), 1);
    assert_eq!(store.prompts()[0].name, "b");
}

#[test]
fn create_conversation_inserts_and_selects() {
    let store = store_with_conversation("local-1", "hello there");

    assert_eq!(store.conversations().len(), 1);
    assert_eq!(store.current_conversation_id(), Some("local-1"));
    assert_eq!(
        store.current_conversation().map(|c| c.title.as_str()),
        Some("hello there")
    );
}

#[test]
fn create_conversation_with_duplicate_id_selects_without_duplicating() {
    let mut store = store_with_conversation("local-1", "first");
    store.set_current_conversation(None);

    store.create_conversation(Conversation::new("local-1", "second"));

    assert_eq!(store.conversations().len(), 1);
    assert_eq!(store.conversations()[0].title, "first");
    assert_eq!(store.current_conversation_id(), Some("local-1"));
}

#[test]
fn update_conversation_id_rewrites_id_and_selection_together() {
    let mut store = store_with_conversation("local-1", "hello");
    store.append_message("local-1", Message::user("m1", "hi"));

    store.update_conversation_id("local-1", "doc-9");

    assert_eq!(store.conversations().len(), 1);
    assert!(store.conversation("local-1").is_none());
    let conversation = store
        .conversation("doc-9")
        .expect("conversation should be addressable by the new id");
    assert_eq!(conversation.messages.len(), 1);
    assert_eq!(store.current_conversation_id(), Some("doc-9"));
}

#[test]
fn update_conversation_id_leaves_other_selection_alone() {
    let mut store = store_with_conversation("local-1", "first");
    store.create_conversation(Conversation::new("local-2", "second"));

    store.update_conversation_id("local-1", "doc-1");

    assert_eq!(store.current_conversation_id(), Some("local-2"));
    assert!(store.conversation("doc-1").is_some());
}

#[test]
fn rename_conversation_updates_title() {
    let mut store = store_with_conversation("local-1", "old title");

    store.rename_conversation("local-1", "new title");
    assert_eq!(
        store.conversation("local-1").map(|c| c.title.as_str()),
        Some("new title")
    );

    // Unknown identifier: total no-op.
    store.rename_conversation("missing", "whatever");
    assert_eq!(store.conversations().len(), 1);
}

#[test]
fn delete_conversation_clears_selection_only_when_it_was_current() {
    let mut store = store_with_conversation("local-1", "first");
    store.create_conversation(Conversation::new("local-2", "second"));

    store.delete_conversation("local-1");
    assert_eq!(store.conversations().len(), 1);
    assert_eq!(store.current_conversation_id(), Some("local-2"));

    store.delete_conversation("local-2");
    assert!(store.conversations().is_empty());
    assert_eq!(store.current_conversation_id(), None);
}

#[test]
fn append_message_preserves_order_and_reports_unknown_targets() {
    let mut store = store_with_conversation("local-1", "hello");

    assert!(store.append_message("local-1", Message::user("m1", "hi")));
    assert!(store.append_message("local-1", Message::assistant("m2", "Hello!")));
    assert!(!store.append_message("missing", Message::user("m3", "lost")));

    let conversation = store.conversation("local-1").expect("conversation exists");
    assert_eq!(conversation.messages.len(), 2);
    assert_eq!(conversation.messages[0].role, Role::User);
    assert_eq!(conversation.messages[1].content, "Hello!");
}

#[test]
fn flag_reducers_toggle_state() {
    let mut store = ConversationStore::new();
    assert!(!store.is_loading());
    assert!(store.is_banner_visible());

    store.set_loading(true);
    store.set_banner_visible(false);
    assert!(store.is_loading());
    assert!(!store.is_banner_visible());
}

#[test]
fn message_roles_serialize_lowercase() {
    let message = Message::assistant("m1", "Hello!");
    let json = serde_json::to_value(&message).expect("message should serialize");
    assert_eq!(json["role"], "assistant");
    assert_eq!(json["id"], "m1");
}

#[test]
fn conversation_deserializes_with_missing_messages_field() {
    let conversation: Conversation =
        serde_json::from_str(r#"{"id":"doc-1","title":"hello"}"#)
            .expect("messages should default to empty");
    assert!(conversation.messages.is_empty());
}
