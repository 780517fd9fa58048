//! Terminal rendering for analysis results

use crate::models::AnalysisResult;

/// Format a price as Indian Rupees with lakh/crore grouping, no paise.
/// `123456.4` → `₹1,23,456`
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, last_three) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("{},{}", groups.join(","), last_three)
    };

    if negative {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

/// Multi-line report for the CLI
pub fn render_report(result: &AnalysisResult) -> String {
    let a = &result.analysis;
    let mut out = String::new();

    out.push_str(&format!("=== {} ===\n", a.product_name));
    out.push_str(&format!("Verdict: {}\n", a.verdict.label()));
    if !a.best_time.is_empty() {
        out.push_str(&format!("Best time to buy: {}\n", a.best_time));
    }
    out.push('\n');

    out.push_str(&format!("Current price:      {}\n", format_inr(a.current_price)));

    let low_note = if a.is_near_low() {
        "Close to All-Time Low!".to_string()
    } else {
        match a.premium_over_low_pct() {
            Some(pct) => format!("{}% higher than low", pct),
            None => String::new(),
        }
    };
    out.push_str(&format!(
        "Lowest price (1Y):  {}  {}\n",
        format_inr(a.lowest_price),
        low_note
    ));
    out.push_str(&format!("Highest price (1Y): {}\n", format_inr(a.highest_price)));

    if !a.history.is_empty() {
        out.push_str("\nPrice history:\n");
        for point in &a.history {
            out.push_str(&format!("  {:<4} {}\n", point.month, format_inr(point.price)));
        }
    }

    if !a.analysis_text.is_empty() {
        out.push_str(&format!("\n{}\n", a.analysis_text));
    }

    if !a.reliable_sources.is_empty() {
        out.push_str(&format!("\nRetailers: {}\n", a.reliable_sources.join(", ")));
    }

    if !result.citations.is_empty() {
        out.push_str("\nSources verified by Google Search:\n");
        for (i, citation) in result.citations.iter().enumerate() {
            out.push_str(&format!("  {}. {} <{}>\n", i + 1, citation.label(), citation.uri));
        }
    }

    out
}
