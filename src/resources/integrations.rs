//! OS integrations: file-type handlers (`duti`) and the user crontab.
use anyhow::Result;
use std::path::Path;

use super::ResourceChange;
use crate::context::Context;
use crate::error::CommandError;

/// Register file-type handlers with `duti <handlers>`.
///
/// # Errors
///
/// Returns [`CommandError::ExternalCommand`] when `duti` exits non-zero.
pub fn run_duti(ctx: &Context, handlers: &Path) -> Result<ResourceChange> {
    let Some(duti) = ctx.executor.which("duti") else {
        ctx.log
            .warn("duti is not available, file handlers not registered");
        return Ok(ResourceChange::Skipped {
            reason: "duti not found".to_string(),
        });
    };
    let duti = duti.to_string_lossy();
    let handlers = handlers.to_string_lossy();

    ctx.log.info(&format!("duti {handlers}"));
    let result = ctx.executor.run_unchecked(&duti, &[&*handlers])?;
    if !result.success {
        return Err(CommandError::ExternalCommand {
            program: "duti".to_string(),
            code: result.code.unwrap_or(-1),
            stderr: result.stderr.trim().to_string(),
        }
        .into());
    }
    Ok(ResourceChange::Applied)
}

/// Install `file` as the user crontab, or remove the crontab when `file`
/// does not exist.
///
/// # Errors
///
/// Returns [`CommandError::ExternalCommand`] when installing an existing
/// file fails. A failing `crontab -r` is not an error.
pub fn set_crontab(ctx: &Context, file: &Path) -> Result<ResourceChange> {
    let Some(crontab) = ctx.executor.which("crontab") else {
        ctx.log.warn("crontab is not available, crontab not set");
        return Ok(ResourceChange::Skipped {
            reason: "crontab not found".to_string(),
        });
    };
    let crontab = crontab.to_string_lossy();

    let exists = file.is_file();
    let file_arg = file.to_string_lossy();
    let args: [&str; 1] = if exists {
        ctx.log.info(&format!("crontab {file_arg}"));
        [&*file_arg]
    } else {
        ctx.log.warn(&format!(
            "{} not found: deactivating crontab",
            file.display()
        ));
        ["-r"]
    };

    let result = ctx.executor.run_unchecked(&crontab, &args)?;
    if !result.success && exists {
        return Err(CommandError::ExternalCommand {
            program: "crontab".to_string(),
            code: result.code.unwrap_or(-1),
            stderr: result.stderr.trim().to_string(),
        }
        .into());
    }
    Ok(ResourceChange::Applied)
}
