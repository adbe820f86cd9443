use chrono::Local;
use leptos::prelude::*;
use leptos::task::spawn_local;
use shopdesk_shared::aggregate::GroupTotal;
use shopdesk_shared::date::{format_date, parse_date};
use shopdesk_shared::{DateRange, Record};

use crate::analytics::{
    DashboardData, DashboardMetrics, category_breakdown, format_amount, format_currency,
    load_dashboard, percent_of, top_customers, top_products,
};
use crate::auth::use_auth;
use crate::fetch::{LatestOnly, begin_owned};

const DEFAULT_WINDOW_DAYS: u64 = 7;

fn amount(row: &Record, field: &str, decimals: usize) -> String {
    format_amount(row.numeric_field(field).unwrap_or(0.0), decimals)
}

#[component]
fn StatCard(title: &'static str, value: Signal<String>) -> impl IntoView {
    view! {
        <div class="stat">
            <div class="stat-title">{title}</div>
            <div class="stat-value text-primary text-2xl">{value}</div>
        </div>
    }
}

/// Horizontal bar list for grouped revenue.
#[component]
fn RevenueBars(groups: Signal<Vec<GroupTotal>>, show_share: bool) -> impl IntoView {
    let total = move || groups.with(|g| g.iter().map(|g| g.metric("revenue")).sum::<f64>());
    let max = move || {
        groups.with(|g| g.iter().map(|g| g.metric("revenue")).fold(0.0_f64, f64::max))
    };

    view! {
        <Show
            when=move || groups.with(|g| !g.is_empty())
            fallback=|| view! { <p class="text-base-content/50 py-4">"No data for this period."</p> }
        >
            <ul class="space-y-3">
                {move || {
                    let (total, max) = (total(), max());
                    groups
                        .get()
                        .into_iter()
                        .map(|group| {
                            let revenue = group.metric("revenue");
                            let label = group.label.clone().unwrap_or_else(|| group.key_text());
                            let caption = if show_share {
                                format!("{} ({:.1}%)", format_currency(revenue), percent_of(revenue, total))
                            } else {
                                format_currency(revenue)
                            };
                            view! {
                                <li>
                                    <div class="flex justify-between text-sm">
                                        <span>{label}</span>
                                        <span class="font-mono">{caption}</span>
                                    </div>
                                    <progress
                                        class="progress progress-primary w-full"
                                        value=format!("{:.0}", percent_of(revenue, max))
                                        max="100"
                                    ></progress>
                                </li>
                            }
                        })
                        .collect_view()
                }}
            </ul>
        </Show>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();

    let range = RwSignal::new(DateRange::last_days(Local::now().date_naive(), DEFAULT_WINDOW_DAYS));
    let data = RwSignal::new(DashboardData::default());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(Option::<String>::None);
    let latest = StoredValue::new(LatestOnly::new());

    let load = move || {
        let range = range.get_untracked();
        let Some((seq, ticket)) = begin_owned(latest) else {
            return;
        };
        let api = auth.api();
        loading.set(true);
        error.set(None);

        spawn_local(async move {
            let result = load_dashboard(&api, range).await;
            seq.apply(ticket, result, |result| {
                match result {
                    Ok(fresh) => data.set(fresh),
                    Err(err) => error.set(Some(auth.handle_error("Dashboard", &err))),
                }
                loading.set(false);
            });
        });
    };

    // refetch whenever the range changes
    Effect::new(move |_| {
        range.track();
        load();
    });

    let metrics = Memo::new(move |_| data.with(|d| DashboardMetrics::from_daily_sales(&d.daily_sales)));
    let products = Signal::derive(move || data.with(|d| top_products(&d.product_performance)));
    let categories = Signal::derive(move || data.with(|d| category_breakdown(&d.category_performance)));

    let total_sales = Signal::derive(move || format_currency(metrics.get().total_sales));
    let total_orders = Signal::derive(move || format_amount(metrics.get().total_orders as f64, 0));
    let avg_order = Signal::derive(move || format_currency(metrics.get().avg_order_value));
    let customers = Signal::derive(move || format_amount(metrics.get().unique_customers as f64, 0));

    let on_start = move |ev: leptos::ev::Event| {
        if let Ok(date) = parse_date(&event_target_value(&ev)) {
            range.update(|r| *r = r.with_start(date));
        }
    };
    let on_end = move |ev: leptos::ev::Event| {
        if let Ok(date) = parse_date(&event_target_value(&ev)) {
            range.update(|r| *r = r.with_end(date));
        }
    };

    view! {
        <div class="space-y-6">
            <h1 class="text-2xl font-bold">"Sales Analytics Dashboard"</h1>

            <div class="card bg-base-100 shadow">
                <div class="card-body flex-row flex-wrap items-end gap-4">
                    <h2 class="card-title w-full">"Date Range"</h2>
                    <label class="form-control">
                        <span class="label-text">"Start Date"</span>
                        <input
                            id="start-date"
                            type="date"
                            class="input input-bordered"
                            prop:value=move || format_date(range.get().start)
                            on:change=on_start
                        />
                    </label>
                    <label class="form-control">
                        <span class="label-text">"End Date"</span>
                        <input
                            id="end-date"
                            type="date"
                            class="input input-bordered"
                            prop:value=move || format_date(range.get().end)
                            on:change=on_end
                        />
                    </label>
                </div>
            </div>

            {move || {
                if let Some(message) = error.get() {
                    view! {
                        <div class="card bg-base-100 shadow">
                            <div class="card-body items-center text-center">
                                <h2 class="card-title text-error">"Error"</h2>
                                <p>{message}</p>
                                <button class="btn btn-primary" on:click=move |_| load()>
                                    "Try Again"
                                </button>
                            </div>
                        </div>
                    }
                        .into_any()
                } else if loading.get() {
                    view! {
                        <div class="flex justify-center py-16">
                            <span class="loading loading-spinner loading-lg"></span>
                            <span class="ml-4 text-xl">"Loading dashboard..."</span>
                        </div>
                    }
                        .into_any()
                } else {
                    ().into_any()
                }
            }}

            <Show when=move || error.with(Option::is_none) && !loading.get()>
                <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                    <StatCard title="Total Sales" value=total_sales />
                    <StatCard title="Total Orders" value=total_orders />
                    <StatCard title="Avg. Order Value" value=avg_order />
                    <StatCard title="Unique Customers" value=customers />
                </div>

                <div class="grid gap-6 lg:grid-cols-2">
                    <div class="card bg-base-100 shadow">
                        <div class="card-body">
                            <h2 class="card-title">"Daily Sales"</h2>
                            <div class="overflow-auto max-h-72">
                                <table class="table table-sm">
                                    <thead>
                                        <tr>
                                            <th>"Date"</th>
                                            <th>"Sales (KES)"</th>
                                            <th>"Orders"</th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        {move || {
                                            data.get()
                                                .daily_sales
                                                .into_iter()
                                                .map(|row| {
                                                    view! {
                                                        <tr>
                                                            <td>{row.text_field("date").unwrap_or_default()}</td>
                                                            <td class="font-mono">{amount(&row, "total_sales", 2)}</td>
                                                            <td>{amount(&row, "order_count", 0)}</td>
                                                        </tr>
                                                    }
                                                })
                                                .collect_view()
                                        }}
                                    </tbody>
                                </table>
                            </div>
                        </div>
                    </div>

                    <div class="card bg-base-100 shadow">
                        <div class="card-body">
                            <h2 class="card-title">"Top Products by Revenue"</h2>
                            <RevenueBars groups=products show_share=false />
                        </div>
                    </div>

                    <div class="card bg-base-100 shadow">
                        <div class="card-body">
                            <h2 class="card-title">"Category Revenue Distribution"</h2>
                            <RevenueBars groups=categories show_share=true />
                        </div>
                    </div>

                    <div class="card bg-base-100 shadow">
                        <div class="card-body">
                            <h2 class="card-title">"Top Customers"</h2>
                            <div class="overflow-auto max-h-72">
                                <table class="table table-sm">
                                    <thead>
                                        <tr>
                                            <th>"Customer"</th>
                                            <th>"Total Spent"</th>
                                            <th>"Orders"</th>
                                            <th>"Avg. Order"</th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        {move || {
                                            data.with(|d| top_customers(&d.customer_insights).to_vec())
                                                .into_iter()
                                                .map(|c| {
                                                    view! {
                                                        <tr>
                                                            <td>{c.text_field("user_email").unwrap_or_default()}</td>
                                                            <td class="font-mono">"KES " {amount(&c, "total_spent", 2)}</td>
                                                            <td>{amount(&c, "orders_count", 0)}</td>
                                                            <td class="font-mono">"KES " {amount(&c, "average_order_value", 2)}</td>
                                                        </tr>
                                                    }
                                                })
                                                .collect_view()
                                        }}
                                    </tbody>
                                </table>
                            </div>
                        </div>
                    </div>
                </div>
            </Show>
        </div>
    }
}
