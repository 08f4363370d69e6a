//! Option pipeline composed from a [`Config`]

use crate::config::Config;
use crate::core::cores::Core;
use crate::core::error::Result;
use crate::core::logger::LoggerOption;
use crate::core::sampling::SamplerCore;
use crate::sinks::WriteSyncer;
use std::sync::Arc;
use std::time::Duration;

/// Sampling windows are one second long
pub const SAMPLING_TICK: Duration = Duration::from_secs(1);

/// Translate the cross-cutting parts of `config` into logger options
///
/// The order is fixed: error output, development mode, caller annotation, stack
/// trace threshold, then the sampler. Negative sampling counts are rejected here.
pub fn build_options(
    config: &Config,
    err_sink: Arc<dyn WriteSyncer>,
) -> Result<Vec<LoggerOption>> {
    let mut options = vec![LoggerOption::ErrorOutput(err_sink)];

    if config.development {
        options.push(LoggerOption::Development);
    }

    if !config.disable_caller {
        options.push(LoggerOption::AddCaller);
    }

    if !config.disable_stacktrace {
        options.push(LoggerOption::AddStacktrace(config.stacktrace_level()));
    }

    if let Some(sampling) = &config.sampling {
        let (initial, thereafter) = sampling.validated()?;
        let hook = sampling.hook.clone();
        options.push(LoggerOption::wrap_core(move |core| {
            let sampler = SamplerCore::new(core, SAMPLING_TICK, initial, thereafter);
            let sampled: Arc<dyn Core> = match &hook {
                Some(hook) => Arc::new(sampler.with_hook(Arc::clone(hook))),
                None => Arc::new(sampler),
            };
            sampled
        }));
    }

    Ok(options)
}
