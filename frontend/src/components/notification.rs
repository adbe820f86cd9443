//! Transient toast shown after mutations.

use gloo_timers::callback::Timeout;
use leptos::prelude::*;

const DISMISS_AFTER_MS: u32 = 3_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

#[component]
pub fn Toast(notice: RwSignal<Option<Notice>>) -> impl IntoView {
    // replacing the handle cancels the previous timer, so a newer notice
    // gets its full display time
    let pending = StoredValue::new_local(None::<Timeout>);

    Effect::new(move |_| {
        if notice.with(Option::is_some) {
            let timeout = Timeout::new(DISMISS_AFTER_MS, move || notice.set(None));
            pending.set_value(Some(timeout));
        }
    });

    view! {
        {move || {
            notice
                .get()
                .map(|n| {
                    let class = if n.is_error {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    };
                    view! {
                        <div class="toast toast-top toast-end z-50">
                            <div class=class>
                                <span>{n.message}</span>
                                <button class="btn btn-ghost btn-xs" on:click=move |_| notice.set(None)>
                                    "✕"
                                </button>
                            </div>
                        </div>
                    }
                })
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_kinds() {
        assert!(!Notice::success("Product updated").is_error);
        let failed = Notice::error("Failed to delete order #7");
        assert!(failed.is_error);
        assert_eq!(failed.message, "Failed to delete order #7");
    }
}
