//! Report output

pub mod report_writer;

pub use report_writer::{
    render_comparison_report, render_link_report, render_phrase_report, write_batch_report,
    write_comparison_report, write_json, write_link_report,
};
