use crate::api::{StoreCommand, TaskStore};
use crate::components::ui::textarea::fit_to_content;
use crate::components::ui::{
    AlertDescription, AlertError, Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader,
    CardItem, CardList, CardTitle, Popover, PopoverContent, PopoverTitle, PopoverTrigger, Textarea,
};
use crate::models::Task;
use crate::state::{AppContext, KeyAction, TodoList, ValidationError};
use crate::util::now_ms;
use icons::X;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Send a command and log its outcome. Failures go to the error banner;
/// nothing is retried or rolled back.
fn dispatch<S: TaskStore>(store: &S, list: RwSignal<TodoList>, command: StoreCommand) {
    let store = store.clone();
    spawn_local(async move {
        let label = command.label();
        match store.execute(command.clone()).await {
            Ok(()) => tracing::debug!("{label}: acknowledged"),
            Err(e) => {
                tracing::error!(kind = %e.kind, error = %e, "{label} failed");
                list.try_update(|l| l.record_failure(&command, &e));
            }
        }
    });
}

#[component]
pub fn TodoListPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let store = StoredValue::new(app_state.0.store.clone());
    let list: RwSignal<TodoList> = RwSignal::new(TodoList::new(app_state.0.config.preview_chars));

    // One live subscription per mounted view, released when the view goes away.
    let subscription = store.with_value(|s| {
        s.subscribe(move |snapshot| {
            list.try_update(|l| l.apply_snapshot(snapshot));
        })
    });
    let subscription = match subscription {
        Ok(sub) => Some(sub),
        Err(e) => {
            tracing::error!(error = %e, "could not subscribe to tasks");
            list.update(|l| l.record_subscribe_failure(&e));
            None
        }
    };
    let subscription = StoredValue::new_local(subscription);
    on_cleanup(move || {
        subscription.try_update_value(|sub| {
            sub.take();
        });
    });

    let send = Callback::new(move |command: StoreCommand| {
        store.with_value(|s| dispatch(s, list, command));
    });

    // Rows are keyed by id and read their own task, so a snapshot only
    // re-mounts rows that appeared.
    let task_ids = Memo::new(move |_| {
        list.with(|l| l.tasks().iter().map(|t| t.id.clone()).collect::<Vec<String>>())
    });
    let last_error = Memo::new(move |_| list.with(|l| l.last_error().map(|e| e.to_string())));
    let compose = Signal::derive(move || list.with(|l| l.compose_text().to_string()));

    let add_task = move || {
        let command = list.try_update(|l| l.add_task(now_ms())).flatten();
        if let Some(command) = command {
            send.run(command);
        }
    };

    let on_compose_key = Callback::new(move |ev: web_sys::KeyboardEvent| {
        if KeyAction::classify(&ev.key(), ev.shift_key()) == KeyAction::Submit {
            ev.prevent_default();
            add_task();
        }
    });

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-md px-4 py-10">
                <Card>
                    <CardHeader>
                        <CardTitle class="text-2xl">"Todo List"</CardTitle>
                    </CardHeader>

                    <CardContent class="flex flex-col gap-3">
                        <Show when=move || last_error.get().is_some() fallback=|| ().into_view()>
                            <AlertError>
                                <AlertDescription class="text-destructive">
                                    {move || last_error.get().unwrap_or_default()}
                                </AlertDescription>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Icon
                                    attr:aria-label="Dismiss"
                                    on:click=move |_| list.update(|l| l.dismiss_error())
                                >
                                    <X />
                                </Button>
                            </AlertError>
                        </Show>

                        <div class="flex items-start gap-2 border-b pb-4">
                            <Textarea
                                id="new-task"
                                placeholder="Add a new task..."
                                value=compose
                                on_value=Callback::new(move |text: String| list.update(|l| l.set_compose_text(&text)))
                                on_keydown=on_compose_key
                            />
                            <Button on:click=move |_| add_task()>"Add"</Button>
                        </div>

                        <Show
                            when=move || !task_ids.with(|ids| ids.is_empty())
                            fallback=|| view! { <div class="text-xs text-muted-foreground">"No tasks yet."</div> }
                        >
                            <CardList>
                                <For
                                    each=move || task_ids.get()
                                    key=|id| id.clone()
                                    children=move |id| view! { <TaskRow task_id=id list=list send=send /> }
                                />
                            </CardList>
                        </Show>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
fn TaskRow(task_id: String, list: RwSignal<TodoList>, send: Callback<StoreCommand>) -> impl IntoView {
    let task_id = StoredValue::new(task_id);
    let task: Memo<Option<Task>> =
        Memo::new(move |_| list.with(|l| task_id.with_value(|id| l.task(id).cloned())));
    let preview = move || {
        let max = list.with_untracked(|l| l.preview_chars());
        task.with(|t| t.as_ref().map(|t| t.preview(max).to_string()).unwrap_or_default())
    };
    let completed = Memo::new(move |_| task.with(|t| t.as_ref().is_some_and(|t| t.completed)));

    // Only flips on open and close, so the focus effect below never re-runs
    // while the user is typing.
    let is_open = Memo::new(move |_| list.with(|l| task_id.with_value(|id| l.is_editing(id))));
    let draft = Signal::derive(move || {
        list.with(|l| l.edit_session().draft().unwrap_or_default().to_string())
    });
    let draft_ref: NodeRef<html::Textarea> = NodeRef::new();

    // Focus and select the draft once the popover is on screen.
    Effect::new(move |_| {
        if is_open.get() {
            if let Some(area) = draft_ref.get() {
                fit_to_content(&area);
                let _ = area.focus();
                area.select();
            }
        }
    });

    let on_open_change = Callback::new(move |open: bool| {
        if open {
            let transition = list
                .try_update(|l| task_id.with_value(|id| l.open_edit_for_task(id)))
                .flatten();
            tracing::debug!(task_id = %task_id.get_value(), ?transition, "edit popover requested");
        } else {
            list.update(|l| l.close_edit());
        }
    });

    let commit = move || {
        let outcome = list.try_update(|l| l.commit_open_edit()).flatten();
        match outcome {
            Some(Ok(command)) => send.run(command),
            Some(Err(ValidationError::EmptyText)) => {
                tracing::info!(task_id = %task_id.get_value(), "refusing empty task text");
                let _ = window().alert_with_message(&ValidationError::EmptyText.to_string());
            }
            None => {}
        }
    };

    let on_draft_key = Callback::new(move |ev: web_sys::KeyboardEvent| {
        match KeyAction::classify(&ev.key(), ev.shift_key()) {
            KeyAction::Submit => {
                ev.prevent_default();
                commit();
            }
            KeyAction::Cancel => {
                ev.prevent_default();
                list.update(|l| l.close_edit());
            }
            KeyAction::Newline | KeyAction::Ignore => {}
        }
    });

    let text_class = move || {
        if completed.get() {
            "flex-1 cursor-pointer overflow-hidden break-words px-1.5 line-through decoration-amber-300 text-muted-foreground"
        } else {
            "flex-1 cursor-pointer overflow-hidden break-words px-1.5"
        }
    };

    view! {
        <CardItem>
            <span
                class=text_class
                on:click=move |_| {
                    let current = completed.get_untracked();
                    send.run(list.with_untracked(|l| l.toggle_completion(&task_id.get_value(), current)))
                }
            >
                {preview}
            </span>

            <Popover open=is_open on_open_change=on_open_change>
                <PopoverTrigger class="h-8 px-3">"Edit"</PopoverTrigger>
                <PopoverContent class="flex flex-col gap-3">
                    <PopoverTitle>"Edit task"</PopoverTitle>
                    <div class="flex items-start gap-2">
                        <Textarea
                            class="text-center resize-none"
                            auto_grow=true
                            value=draft
                            on_value=Callback::new(move |text: String| list.update(|l| l.edit_draft(&text)))
                            on_keydown=on_draft_key
                            node_ref=draft_ref
                        />
                        <Button variant=ButtonVariant::Success size=ButtonSize::Sm on:click=move |_| commit()>
                            "Update"
                        </Button>
                    </div>
                </PopoverContent>
            </Popover>

            // TODO: ask for confirmation before deleting.
            <Button
                variant=ButtonVariant::Destructive
                size=ButtonSize::Sm
                on:click=move |_| send.run(list.with_untracked(|l| l.delete_task(&task_id.get_value())))
            >
                "Delete"
            </Button>
        </CardItem>
    }
}
