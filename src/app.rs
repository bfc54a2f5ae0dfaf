use std::path::PathBuf;

use thiserror::Error;

use crate::config::Config;
use crate::data::loader::{self, LoadError};
use crate::data::model::Series;
use crate::render::{Labeled, RenderError, Renderer};

// ---------------------------------------------------------------------------
// Orchestration: load both traces, then render once
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RunError {
    /// At least one input could not be loaded; nothing was rendered.
    #[error("plotting cancelled: {} input file(s) could not be loaded", .0.len())]
    Cancelled(Vec<LoadError>),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Load the CUBIC and NewReno traces named by `config` and hand them to
/// `renderer`. Returns the path of the written chart.
///
/// Both inputs are always attempted so every problem is reported, but the
/// renderer is only called when both loaded.
pub fn run(config: &Config, renderer: &dyn Renderer) -> Result<PathBuf, RunError> {
    let inputs = config.inputs();

    let cubic = load_reporting(&inputs.cubic);
    let newreno = load_reporting(&inputs.newreno);

    let (cubic, newreno) = match (cubic, newreno) {
        (Ok(c), Ok(n)) => (c, n),
        (c, n) => {
            let failures: Vec<LoadError> = [c.err(), n.err()].into_iter().flatten().collect();
            return Err(RunError::Cancelled(failures));
        }
    };

    let chart = &config.chart;
    for (style, series) in [(&chart.cubic, &cubic), (&chart.newreno, &newreno)] {
        match series.summary() {
            Some(summary) => log::info!("{}: {summary}", style.label),
            None => log::warn!("{}: no valid samples, plotting an empty series", style.label),
        }
    }

    let output = config.output();
    renderer.render(
        Labeled::new(&chart.cubic.label, &cubic),
        Labeled::new(&chart.newreno.label, &newreno),
        &output,
    )?;
    Ok(output)
}

fn load_reporting(path: &std::path::Path) -> Result<Series, LoadError> {
    loader::load(path).inspect_err(|e| {
        log::error!("{e}");
        if e.is_not_found() {
            log::error!("run the simulation first or check the file name");
        }
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;

    use super::*;
    use crate::config::Inputs;
    use crate::data::model::Sample;

    /// Fails the test if the orchestrator ever gets as far as rendering.
    struct MustNotRender;

    impl Renderer for MustNotRender {
        fn render(&self, _: Labeled<'_>, _: Labeled<'_>, _: &Path) -> Result<(), RenderError> {
            panic!("renderer invoked after a failed load");
        }
    }

    /// Records what it was asked to draw.
    #[derive(Default)]
    struct Recording {
        calls: RefCell<Vec<(String, Series, String, Series, PathBuf)>>,
    }

    impl Renderer for Recording {
        fn render(&self, a: Labeled<'_>, b: Labeled<'_>, output: &Path) -> Result<(), RenderError> {
            self.calls.borrow_mut().push((
                a.label.to_string(),
                a.series.clone(),
                b.label.to_string(),
                b.series.clone(),
                output.to_path_buf(),
            ));
            Ok(())
        }
    }

    struct Failing;

    impl Renderer for Failing {
        fn render(&self, _: Labeled<'_>, _: Labeled<'_>, _: &Path) -> Result<(), RenderError> {
            Err(RenderError::Draw("backend exploded".to_string()))
        }
    }

    fn config_in(dir: &Path) -> Config {
        Config {
            inputs: Some(Inputs {
                cubic: dir.join("cubic.dat"),
                newreno: dir.join("newreno.dat"),
            }),
            output: Some(dir.join("out.png")),
            ..Config::default()
        }
    }

    #[test]
    fn missing_first_input_never_renders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("newreno.dat"), "0.0 536\n").unwrap();

        let err = run(&config_in(dir.path()), &MustNotRender).unwrap_err();
        match err {
            RunError::Cancelled(failures) => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].is_not_found());
                assert!(failures[0].path().ends_with("cubic.dat"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn both_missing_reports_both() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&config_in(dir.path()), &MustNotRender).unwrap_err();
        assert!(matches!(err, RunError::Cancelled(ref f) if f.len() == 2));
        assert_eq!(
            err.to_string(),
            "plotting cancelled: 2 input file(s) could not be loaded"
        );
    }

    #[test]
    fn renders_both_series_with_labels() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cubic.dat"), "0.0 1000\n0.5 bad\n1.0 2000\n").unwrap();
        std::fs::write(dir.path().join("newreno.dat"), "0.0 536\n\n1.0 1072\n").unwrap();

        let renderer = Recording::default();
        let output = run(&config_in(dir.path()), &renderer).unwrap();
        assert_eq!(output, dir.path().join("out.png"));

        let calls = renderer.calls.into_inner();
        assert_eq!(calls.len(), 1);
        let (label_a, a, label_b, b, path) = &calls[0];
        assert_eq!(label_a, "TCP CUBIC");
        assert_eq!(a.samples(), &[Sample::new(0.0, 1000), Sample::new(1.0, 2000)]);
        assert_eq!(label_b, "TCP NewReno");
        assert_eq!(b.len(), 2);
        assert_eq!(path, &output);
    }

    #[test]
    fn empty_input_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cubic.dat"), "").unwrap();
        std::fs::write(dir.path().join("newreno.dat"), "0.0 536\n").unwrap();

        let renderer = Recording::default();
        run(&config_in(dir.path()), &renderer).unwrap();

        let calls = renderer.calls.into_inner();
        assert!(calls[0].1.is_empty());
    }

    #[test]
    fn render_failure_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cubic.dat"), "0.0 536\n").unwrap();
        std::fs::write(dir.path().join("newreno.dat"), "0.0 536\n").unwrap();

        let err = run(&config_in(dir.path()), &Failing).unwrap_err();
        assert!(matches!(err, RunError::Render(RenderError::Draw(_))));
    }
}
