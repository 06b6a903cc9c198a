// Console renditions of the dashboard pages
use crate::analyzer::filter::{ALL, Criteria, FilterPipeline, active};
use crate::analyzer::report::{Reporter, unique_values, value_frequency};
use crate::console::render;
use crate::export::{ExportError, ExportFile, explorer_filename, products_filename};
use crate::model::{Column, Dataset, View};
use crate::registry::Registry;
use std::collections::BTreeSet;
use tracing::warn;

const MAX_TABLE_ROWS: usize = 50;

/// Rendered text plus the CSV of the table it shows, if any.
#[derive(Debug, Default)]
pub struct Page {
    pub text: String,
    pub export: Option<ExportFile>,
}

impl Page {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            export: None,
        }
    }
}

/// Which listing `/options` shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Categories,
    Regions,
    Campuses,
    Certifications,
    Distributors,
    Suppliers,
}

impl OptionKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "categories" | "category" => Some(Self::Categories),
            "regions" | "region" => Some(Self::Regions),
            "campuses" | "campus" => Some(Self::Campuses),
            "certifications" | "certification" | "certs" | "cert" => Some(Self::Certifications),
            "distributors" | "distributor" => Some(Self::Distributors),
            "suppliers" | "supplier" => Some(Self::Suppliers),
            _ => None,
        }
    }
}

fn table_rows(view: &View<'_>, columns: &[Column]) -> Vec<Vec<String>> {
    view.iter()
        .map(|r| columns.iter().map(|c| r.value(*c).into_owned()).collect())
        .collect()
}

fn render_table(view: &View<'_>, columns: &[Column]) -> String {
    let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
    render::table(&headers, &table_rows(view, columns), MAX_TABLE_ROWS)
}

fn attach_export(page: &mut Page, export: Result<ExportFile, ExportError>) {
    match export {
        Ok(file) => page.export = Some(file),
        Err(e) => warn!("Could not prepare export: {}", e),
    }
}

fn certification_chart(reporter: &Reporter<'_>, view: &View<'_>) -> Option<String> {
    let counts = reporter.certification_counts(view);
    if counts.is_empty() {
        return None;
    }
    let bars: Vec<(String, usize)> = counts.into_iter().map(|c| (c.label, c.count)).collect();
    Some(render::bar_chart(&bars))
}

/// One line per procuring campus contact across the view, sorted.
fn campus_contacts(view: &View<'_>) -> String {
    let contacts: BTreeSet<&str> = view
        .iter()
        .flat_map(|r| r.derived.procuring_campus_contacts.iter().map(String::as_str))
        .collect();
    if contacts.is_empty() {
        return "—".to_string();
    }
    contacts.into_iter().map(|c| format!("- {c}")).collect::<Vec<_>>().join("\n")
}

/// Landing page: certification counts as a list.
pub fn overview(dataset: &Dataset, registry: &Registry) -> Page {
    let counts = Reporter::new(registry).certification_counts(&dataset.view());
    let mut text = String::from("Sustainability Certifications Overview\n");
    if dataset.is_empty() || counts.is_empty() {
        text.push_str("No certification counts available for the current data.");
    } else {
        let lines: Vec<String> = counts.iter().map(|c| format!("- {}: {}", c.label, c.count)).collect();
        text.push_str(&lines.join("\n"));
    }
    Page::text(text)
}

pub fn glossary(registry: &Registry) -> Page {
    let mut lines = vec!["Glossary of Certification Terms".to_string()];
    for cert in &registry.certifications {
        match &cert.note {
            Some(note) => lines.push(format!("{}: {} ({})", cert.code, cert.label, note)),
            None => lines.push(format!("{}: {}", cert.code, cert.label)),
        }
    }
    Page::text(lines.join("\n"))
}

/// Category explorer: filtered product table, suppliers, campuses, chart.
pub fn explorer(dataset: &Dataset, registry: &Registry, criteria: &Criteria, threshold: f64) -> Page {
    let pipeline = FilterPipeline::new(registry).with_threshold(threshold);
    let view = pipeline.apply(&dataset.view(), criteria);

    let selection: Vec<String> = [
        ("category", &criteria.category),
        ("region", &criteria.region),
        ("campus", &criteria.campus),
        ("certification", &criteria.certification),
        ("search", &criteria.search_text),
    ]
    .into_iter()
    .filter_map(|(key, value)| active(value).map(|v| format!("{key}={v}")))
    .collect();
    let header = if selection.is_empty() {
        format!("Product Explorer (category={ALL})")
    } else {
        format!("Product Explorer ({})", selection.join(", "))
    };

    if view.is_empty() {
        return Page::text(format!(
            "{header}\nNo products found for the selected filters. Please try a different combination."
        ));
    }

    let reporter = Reporter::new(registry);
    let columns = [
        Column::ProductName,
        Column::Supplier,
        Column::Distributor,
        Column::Standard,
        Column::CampusesProcuring,
    ];
    let mut campuses: Vec<String> = reporter
        .procuring_campuses(&view)
        .iter()
        .map(|c| c.label.clone())
        .collect();
    campuses.sort();

    let mut text = vec![
        format!("{header}: {} products", view.len()),
        render_table(&view, &columns),
        String::new(),
        "Suppliers Providing These Products".to_string(),
        render::list(&unique_values(&view, Column::Supplier)),
        String::new(),
        "Campuses Purchasing These Products".to_string(),
        render::list(&campuses),
        String::new(),
        "Campus Contacts".to_string(),
        campus_contacts(&view),
        String::new(),
        "Sustainability Certifications".to_string(),
    ];
    text.push(
        certification_chart(&reporter, &view)
            .unwrap_or_else(|| "No sustainability certifications in this selection.".to_string()),
    );

    let mut page = Page::text(text.join("\n"));
    attach_export(&mut page, ExportFile::from_view(explorer_filename(criteria), &view, &columns));
    page
}

/// Which side of the distributor/supplier page is being explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Distributor,
    Supplier,
}

/// Distributor or supplier page: the counterpart list, campuses, products.
pub fn party(dataset: &Dataset, registry: &Registry, side: Party, name: &str) -> Page {
    let (criteria, noun, counterpart, counterpart_title) = match side {
        Party::Distributor => (
            Criteria::all().distributor(name),
            "distributor",
            Column::Supplier,
            format!("Suppliers provided by {name}:"),
        ),
        Party::Supplier => (
            Criteria::all().supplier(name),
            "supplier",
            Column::Distributor,
            format!("Distributors that carry {name}:"),
        ),
    };
    if name.trim().is_empty() {
        return Page::text(format!("Please name a {noun}; see /options {noun}s."));
    }

    let view = FilterPipeline::new(registry).apply(&dataset.view(), &criteria);
    if view.is_empty() {
        return Page::text(format!("No products found for this {noun}."));
    }

    let campuses: Vec<String> = Reporter::new(registry)
        .procuring_campuses(&view)
        .iter()
        .map(|c| c.label.clone())
        .collect();
    let columns = [
        Column::ProductName,
        counterpart,
        Column::Category,
        Column::Standard,
        Column::FullCampusNames,
    ];

    let text = [
        counterpart_title,
        render::list(&unique_values(&view, counterpart)),
        String::new(),
        format!("Campuses purchasing from {name}:"),
        render::list(&campuses),
        String::new(),
        format!("Products from this {noun} ({})", view.len()),
        render_table(&view, &columns),
    ];

    let mut page = Page::text(text.join("\n"));
    attach_export(&mut page, ExportFile::from_view(products_filename(name), &view, &columns));
    page
}

/// Certification distribution across the whole dataset, largest first.
pub fn stats(dataset: &Dataset, registry: &Registry) -> Page {
    let reporter = Reporter::new(registry);
    let view = dataset.view();
    let counts = reporter.certification_counts(&view);
    if counts.is_empty() {
        return Page::text("Sustainability Certifications Overview\nNo sustainability certifications found in the current dataset.");
    }

    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|c| vec![c.label.clone(), c.count.to_string()])
        .collect();
    let text = [
        "Sustainability Certifications Overview".to_string(),
        "Distribution of Certifications Across All Products".to_string(),
        certification_chart(&reporter, &view).unwrap_or_default(),
        String::new(),
        render::table(&["Certification", "Count"], &rows, MAX_TABLE_ROWS),
    ];

    let mut page = Page::text(text.join("\n"));
    attach_export(
        &mut page,
        ExportFile::from_rows("certification_counts.csv".into(), &["Certification", "Count"], rows),
    );
    page
}

fn with_counts(view: &View<'_>, column: Column) -> Vec<String> {
    value_frequency(view, column)
        .into_iter()
        .map(|(name, n)| format!("{name} ({n} products)"))
        .collect()
}

/// Dropdown contents.
pub fn options(dataset: &Dataset, registry: &Registry, kind: OptionKind) -> Page {
    let view = dataset.view();
    let (title, items): (&str, Vec<String>) = match kind {
        OptionKind::Categories => {
            let mut items = vec![ALL.to_string()];
            items.extend(unique_values(&view, Column::Category));
            ("Food categories", items)
        }
        OptionKind::Regions => (
            "Regions",
            registry
                .regions()
                .into_iter()
                .map(|(name, codes)| format!("{} ({})", name, codes.join(", ")))
                .collect(),
        ),
        OptionKind::Campuses => (
            "Campuses",
            registry
                .campuses
                .iter()
                .map(|c| format!("{} ({})", c.code, c.label))
                .collect(),
        ),
        OptionKind::Certifications => (
            "Sustainability standards",
            registry
                .certifications
                .iter()
                .map(|c| format!("{} ({})", c.code, c.label))
                .collect(),
        ),
        OptionKind::Distributors => ("Distributors", with_counts(&view, Column::Distributor)),
        OptionKind::Suppliers => ("Suppliers", with_counts(&view, Column::Supplier)),
    };

    if items.is_empty() {
        return Page::text(format!("{title}: none found in the dataset."));
    }
    let lines: Vec<String> = items.iter().map(|i| format!("- {i}")).collect();
    Page::text(format!("{title}:\n{}", lines.join("\n")))
}
