//! Table building blocks: sortable column headers and a pager.

use leptos::prelude::*;
use shopdesk_shared::dataset::{Page, SortDirection, SortState};

#[component]
pub fn SortHeader(
    label: &'static str,
    column: &'static str,
    sort: RwSignal<SortState>,
) -> impl IntoView {
    let indicator = move || match sort.with(|s| s.indicator(column)) {
        Some(SortDirection::Ascending) => " ▲",
        Some(SortDirection::Descending) => " ▼",
        None => "",
    };

    view! {
        <th
            class="cursor-pointer select-none hover:bg-base-200"
            on:click=move |_| sort.update(|s| *s = s.request_sort(column))
        >
            {label}
            <span class="text-xs opacity-60">{indicator}</span>
        </th>
    }
}

/// Previous / next controls for a [`Page`]. `page` is written back clamped.
#[component]
pub fn Pager<T>(page: Signal<Page<T>>, current: RwSignal<usize>) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
{
    let info = move || {
        page.with(|p| format!("Page {} of {} ({} rows)", p.page, p.total_pages, p.total_items))
    };
    let prev_disabled = move || page.with(|p| !p.has_previous());
    let next_disabled = move || page.with(|p| !p.has_next());

    view! {
        <div class="flex items-center justify-between p-4 text-sm">
            <span class="opacity-70">{info}</span>
            <div class="join">
                <button
                    class="join-item btn btn-sm"
                    disabled=prev_disabled
                    on:click=move |_| current.set(page.with(|p| p.page.saturating_sub(1).max(1)))
                >
                    "«"
                </button>
                <button
                    class="join-item btn btn-sm"
                    disabled=next_disabled
                    on:click=move |_| current.set(page.with(|p| p.page + 1))
                >
                    "»"
                </button>
            </div>
        </div>
    }
}
