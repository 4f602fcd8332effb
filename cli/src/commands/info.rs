use colored::*;

use revmap_common::config::{API_KEY_VAR, CSE_ID_VAR, Settings};
use revmap_core::Stores;

use crate::terminal::{colors, print, spinner};

const KEY_WIDTH: usize = 16;

pub async fn info(settings: &Settings) -> anyhow::Result<()> {
    let q = settings.quiet;

    print::header("configuration", q);
    let set = |present: bool| -> ColoredString {
        if present { "set".green() } else { "missing".red().bold() }
    };
    print::aligned_line(API_KEY_VAR, KEY_WIDTH, set(settings.api_key.is_some()));
    print::aligned_line(CSE_ID_VAR, KEY_WIDTH, set(settings.cse_id.is_some()));
    print::aligned_line(
        "Proxy",
        KEY_WIDTH,
        settings.proxy_url.clone().unwrap_or_else(|| "none".into()),
    );
    print::aligned_line(
        "Queries per run",
        KEY_WIDTH,
        format!("{}-{}", settings.query_count.start(), settings.query_count.end()),
    );
    print::aligned_line("Concurrency", KEY_WIDTH, settings.max_concurrency.to_string());
    print::aligned_line(
        "Search delay",
        KEY_WIDTH,
        format!("{}ms", settings.search_delay.as_millis()),
    );

    print::header("collected so far", q);
    let stores = Stores::load(&settings.stores).await?;
    let rows = [
        ("IPs", &settings.stores.ips, stores.ips.len()),
        ("Domains", &settings.stores.domains, stores.domains.len()),
        ("Sentences", &settings.stores.queries, stores.queries.len()),
    ];
    for (label, path, count) in rows {
        print::aligned_line(
            label,
            KEY_WIDTH,
            format!(
                "{} {}",
                count.to_string().color(colors::ACCENT).bold(),
                format!("({})", path.display()).color(colors::SEPARATOR)
            ),
        );
    }

    spinner::get_spinner().finish_and_clear();
    print::end_of_program();
    Ok(())
}
