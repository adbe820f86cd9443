//! Product performance: list, edit, date-range report and a summary view.

use leptos::prelude::*;
use leptos::task::spawn_local;
use shopdesk_shared::aggregate::GroupTotal;
use shopdesk_shared::dataset::{SortDirection, SortState, paginate};
use shopdesk_shared::protocol::{
    DeleteProductPerformanceRequest, ListProductPerformanceRequest, ProductPerformanceDetailRequest,
    ProductPerformanceReportRequest, UpdateProductPerformanceRequest,
};
use shopdesk_shared::{DateRange, Record};

use crate::analytics::{format_amount, format_currency, format_rating, revenue_by_product_name};
use crate::auth::use_auth;
use crate::components::notification::{Notice, Toast};
use crate::components::table::{Pager, SortHeader};
use crate::fetch::{LatestOnly, begin_owned};
use crate::forms::{apply_input, input_text};
use crate::web::confirm;

const PAGE_SIZE: usize = 10;
const TEXT_FIELDS: &[&str] = &["date"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    List,
    Edit,
    ReportForm,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    Revenue,
    Units,
    Rating,
}

impl Trend {
    fn field(self) -> &'static str {
        match self {
            Trend::Revenue => "revenue",
            Trend::Units => "units_sold",
            Trend::Rating => "average_rating",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Trend::Revenue => "Revenue",
            Trend::Units => "Units",
            Trend::Rating => "Rating",
        }
    }
}

fn entry_id(entry: &Record) -> String {
    entry.text_field("id").unwrap_or_default()
}

fn product_label(entry: &Record) -> String {
    entry.text_field("product_name").unwrap_or_else(|| {
        format!("Product ID: {}", entry.text_field("product").unwrap_or_default())
    })
}

#[component]
fn EditForm(
    form: RwSignal<Record>,
    on_save: impl Fn() + Copy + Send + Sync + 'static,
    on_cancel: impl Fn() + Copy + Send + Sync + 'static,
) -> impl IntoView {
    let field = move |label: &'static str, name: &'static str, kind: &'static str| {
        view! {
            <label class="form-control">
                <span class="label-text">{label}</span>
                <input
                    type=kind
                    name=name
                    step="any"
                    class="input input-bordered"
                    prop:value=move || form.with(|f| input_text(f, name))
                    on:input=move |ev| {
                        let raw = event_target_value(&ev);
                        form.update(|f| apply_input(f, name, &raw, TEXT_FIELDS));
                    }
                    required
                />
            </label>
        }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Edit Product Performance"</h2>
                <div class="grid grid-cols-1 sm:grid-cols-2 gap-4">
                    {field("Date", "date", "date")}
                    {field("Product ID", "product", "number")}
                    {field("Units Sold", "units_sold", "number")}
                    {field("Revenue", "revenue", "number")}
                    {field("Average Rating", "average_rating", "number")}
                </div>
                <div class="card-actions justify-end mt-4">
                    <button class="btn btn-ghost" on:click=move |_| on_cancel()>"Cancel"</button>
                    <button class="btn btn-primary" on:click=move |_| on_save()>"Save Changes"</button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn Summary(rows: Signal<Vec<Record>>) -> impl IntoView {
    let trend = RwSignal::new(Trend::Revenue);
    let by_product = Signal::derive(move || rows.with(|r| revenue_by_product_name(r)));

    let bar = move |group: &GroupTotal, metric: &'static str, max: f64, is_currency: bool| {
        let value = group.metric(metric);
        let caption = if is_currency { format_currency(value) } else { format_amount(value, 0) };
        let width = if max > 0.0 { value / max * 100.0 } else { 0.0 };
        view! {
            <li>
                <div class="flex justify-between text-sm">
                    <span>{group.label.clone().unwrap_or_default()}</span>
                    <span class="font-mono">{caption}</span>
                </div>
                <progress class="progress progress-secondary w-full" value=format!("{:.0}", width) max="100"></progress>
            </li>
        }
    };

    view! {
        <div class="grid gap-6 lg:grid-cols-2">
            <div class="card bg-base-100 shadow lg:col-span-2">
                <div class="card-body">
                    <div class="flex items-center justify-between">
                        <h2 class="card-title">"Performance Trend"</h2>
                        <div class="join">
                            {[Trend::Revenue, Trend::Units, Trend::Rating]
                                .into_iter()
                                .map(|t| {
                                    view! {
                                        <button
                                            class=move || if trend.get() == t { "join-item btn btn-sm btn-active" } else { "join-item btn btn-sm" }
                                            on:click=move |_| trend.set(t)
                                        >
                                            {t.label()}
                                        </button>
                                    }
                                })
                                .collect_view()}
                        </div>
                    </div>
                    <div class="overflow-auto max-h-72">
                        <table class="table table-sm">
                            <thead>
                                <tr>
                                    <th>"Date"</th>
                                    <th>"Product"</th>
                                    <th>{move || trend.get().label()}</th>
                                </tr>
                            </thead>
                            <tbody>
                                {move || {
                                    let t = trend.get();
                                    rows.get()
                                        .into_iter()
                                        .map(|row| {
                                            let value = match t {
                                                Trend::Rating => format_rating(&row, t.field()),
                                                Trend::Revenue => format_currency(row.numeric_field(t.field()).unwrap_or(0.0)),
                                                Trend::Units => format_amount(row.numeric_field(t.field()).unwrap_or(0.0), 0),
                                            };
                                            view! {
                                                <tr>
                                                    <td>{row.text_field("date").unwrap_or_default()}</td>
                                                    <td>{row.text_field("product_name").unwrap_or_else(|| "Unknown Product".to_string())}</td>
                                                    <td class="font-mono">{value}</td>
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
                    <h2 class="card-title">"Revenue by Product"</h2>
                    <ul class="space-y-3">
                        {move || by_product.with(|groups| {
                            let max = groups.iter().map(|g| g.metric("revenue")).fold(0.0_f64, f64::max);
                            groups.iter().map(|g| bar(g, "revenue", max, true)).collect_view()
                        })}
                    </ul>
                </div>
            </div>

            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <h2 class="card-title">"Units Sold by Product"</h2>
                    <ul class="space-y-3">
                        {move || by_product.with(|groups| {
                            let max = groups.iter().map(|g| g.metric("units_sold")).fold(0.0_f64, f64::max);
                            groups.iter().map(|g| bar(g, "units_sold", max, false)).collect_view()
                        })}
                    </ul>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn ProductsPage() -> impl IntoView {
    let auth = use_auth();

    let entries = RwSignal::new(Vec::<Record>::new());
    let loading = RwSignal::new(false);
    let error = RwSignal::new(Option::<String>::None);
    let notice = RwSignal::new(Option::<Notice>::None);
    let mode = RwSignal::new(Mode::List);
    let form = RwSignal::new(Record::new());
    let selected = RwSignal::new(Option::<String>::None);
    let sort = RwSignal::new(SortState::new("date", SortDirection::Descending));
    let page = RwSignal::new(1usize);
    let report_start = RwSignal::new(String::new());
    let report_end = RwSignal::new(String::new());
    let latest = StoredValue::new(LatestOnly::new());

    let fail = move |context: &str, err: &crate::api::ApiError, message: &str| {
        auth.handle_error(context, err);
        error.set(Some(message.to_string()));
    };

    let fetch_entries = move || {
        let Some((seq, ticket)) = begin_owned(latest) else {
            return;
        };
        let api = auth.api();
        loading.set(true);
        error.set(None);

        spawn_local(async move {
            let result = api.call(&ListProductPerformanceRequest).await;
            seq.apply(ticket, result, |result| {
                match result {
                    Ok(list) => entries.set(list),
                    Err(err) => {
                        entries.set(Vec::new());
                        fail("Product performance", &err, "Failed to fetch product performance data");
                    }
                }
                loading.set(false);
            });
        });
    };

    let open_editor = move |id: String| {
        let api = auth.api();
        loading.set(true);
        error.set(None);
        spawn_local(async move {
            match api.call(&ProductPerformanceDetailRequest { id: id.clone() }).await {
                Ok(detail) => {
                    form.set(detail);
                    selected.set(Some(id));
                    mode.set(Mode::Edit);
                }
                Err(err) => fail("Product performance detail", &err, "Failed to fetch product detail"),
            }
            loading.set(false);
        });
    };

    let save_entry = move || {
        let Some(id) = selected.get_untracked() else {
            return;
        };
        let entry = form.get_untracked();
        let api = auth.api();
        loading.set(true);
        error.set(None);
        spawn_local(async move {
            match api.call(&UpdateProductPerformanceRequest { id, entry }).await {
                Ok(_) => {
                    notice.set(Some(Notice::success("Entry updated")));
                    mode.set(Mode::List);
                    fetch_entries();
                }
                Err(err) => fail("Product performance update", &err, "Failed to update product performance entry"),
            }
            loading.set(false);
        });
    };

    let delete_entry = move |id: String| {
        if !confirm("Are you sure you want to delete this entry?") {
            return;
        }
        let api = auth.api();
        spawn_local(async move {
            match api.call(&DeleteProductPerformanceRequest { id }).await {
                Ok(()) => {
                    notice.set(Some(Notice::success("Entry deleted")));
                    fetch_entries();
                }
                Err(err) => fail("Product performance delete", &err, "Failed to delete product performance entry"),
            }
        });
    };

    let generate_report = move || {
        let range = match DateRange::parse(&report_start.get_untracked(), &report_end.get_untracked()) {
            Ok(range) => range,
            Err(err) => {
                error.set(Some(err.to_string()));
                return;
            }
        };
        let Some((seq, ticket)) = begin_owned(latest) else {
            return;
        };
        let api = auth.api();
        loading.set(true);
        error.set(None);

        spawn_local(async move {
            let result = api.call(&ProductPerformanceReportRequest { range }).await;
            seq.apply(ticket, result, |result| {
                match result {
                    Ok(rows) => {
                        entries.set(rows);
                        mode.set(Mode::Summary);
                    }
                    Err(err) => {
                        entries.set(Vec::new());
                        fail("Product performance report", &err, "Failed to generate report");
                    }
                }
                loading.set(false);
            });
        });
    };

    let show_summary = move || {
        if entries.with(Vec::is_empty) {
            error.set(Some("No data available for visualization".to_string()));
        } else {
            error.set(None);
            mode.set(Mode::Summary);
        }
    };

    Effect::new(move |_| fetch_entries());

    let sorted = Memo::new(move |_| entries.with(|list| sort.with(|s| s.apply(list))));
    let current_page = Signal::derive(move || sorted.with(|rows| paginate(rows, page.get(), PAGE_SIZE)));
    let summary_rows = Signal::derive(move || sorted.get());

    let list_view = move || {
        view! {
            <div class="card bg-base-100 shadow-xl">
                <div class="overflow-x-auto">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <SortHeader label="Date" column="date" sort=sort />
                                <SortHeader label="Product" column="product" sort=sort />
                                <SortHeader label="Units Sold" column="units_sold" sort=sort />
                                <SortHeader label="Revenue" column="revenue" sort=sort />
                                <SortHeader label="Avg. Rating" column="average_rating" sort=sort />
                                <th>"Actions"</th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || !loading.get() && entries.with(Vec::is_empty)>
                                <tr>
                                    <td colspan="6" class="text-center py-8 text-base-content/50">
                                        "No product performance data available"
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || current_page.get().items
                                key=|entry| entry.to_string()
                                children=move |entry| {
                                    let id = entry_id(&entry);
                                    let id_for_edit = id.clone();
                                    view! {
                                        <tr>
                                            <td>{entry.text_field("date").unwrap_or_default()}</td>
                                            <td>{product_label(&entry)}</td>
                                            <td>{format_amount(entry.numeric_field("units_sold").unwrap_or(0.0), 0)}</td>
                                            <td class="font-mono">{format_currency(entry.numeric_field("revenue").unwrap_or(0.0))}</td>
                                            <td>{format_rating(&entry, "average_rating")}</td>
                                            <td class="flex gap-2">
                                                <button class="btn btn-sm btn-ghost" on:click=move |_| open_editor(id_for_edit.clone())>
                                                    "Edit"
                                                </button>
                                                <button class="btn btn-sm btn-error btn-outline" on:click=move |_| delete_entry(id.clone())>
                                                    "Delete"
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
                <Pager page=current_page current=page />
            </div>
        }
    };

    let report_form = move || {
        view! {
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h2 class="card-title">"Generate Product Performance Report"</h2>
                    <div class="grid grid-cols-1 sm:grid-cols-2 gap-4">
                        <label class="form-control">
                            <span class="label-text">"Start Date"</span>
                            <input
                                type="date"
                                name="start_date"
                                class="input input-bordered"
                                prop:value=report_start
                                on:input=move |ev| report_start.set(event_target_value(&ev))
                            />
                        </label>
                        <label class="form-control">
                            <span class="label-text">"End Date"</span>
                            <input
                                type="date"
                                name="end_date"
                                class="input input-bordered"
                                prop:value=report_end
                                on:input=move |ev| report_end.set(event_target_value(&ev))
                            />
                        </label>
                    </div>
                    <div class="card-actions justify-end mt-4">
                        <button class="btn btn-ghost" on:click=move |_| mode.set(Mode::List)>"Cancel"</button>
                        <button class="btn btn-primary" disabled=move || loading.get() on:click=move |_| generate_report()>
                            "Generate Report"
                        </button>
                    </div>
                </div>
            </div>
        }
    };

    view! {
        <div class="space-y-4">
            <Toast notice=notice />

            <div class="flex flex-wrap items-center justify-between gap-2">
                <div>
                    <h1 class="text-2xl font-bold">"Product Performance"</h1>
                    <p class="text-base-content/70 text-sm">"Sales, units and ratings per product and day."</p>
                </div>
                <div class="flex flex-wrap gap-2">
                    <button class="btn btn-sm" on:click=move |_| mode.set(Mode::List)>"List"</button>
                    <button class="btn btn-sm" on:click=move |_| show_summary()>"Visualize"</button>
                    <button class="btn btn-sm" on:click=move |_| mode.set(Mode::ReportForm)>"Generate Report"</button>
                    <button class="btn btn-sm btn-primary" disabled=move || loading.get() on:click=move |_| fetch_entries()>
                        "Refresh"
                    </button>
                </div>
            </div>

            {move || error.get().map(|msg| view! {
                <div role="alert" class="alert alert-error text-sm">
                    <span>{msg}</span>
                </div>
            })}

            <Show when=move || loading.get()>
                <div class="flex justify-center py-4">
                    <span class="loading loading-spinner loading-md"></span>
                </div>
            </Show>

            {move || match mode.get() {
                Mode::List => list_view().into_any(),
                Mode::Edit => view! {
                    <EditForm form=form on_save=save_entry on_cancel=move || mode.set(Mode::List) />
                }
                    .into_any(),
                Mode::ReportForm => report_form().into_any(),
                Mode::Summary => view! { <Summary rows=summary_rows /> }.into_any(),
            }}
        </div>
    }
}
