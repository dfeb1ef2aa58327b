use super::*;

pub(super) async fn handle_search(
    state: &WsState,
    ctx: &CommandContext,
    query: &str,
) -> Result<CommandOutcome, CommandError> {
    let (query, results) = state.app.use_cases.library.search(query).await?;
    tracing::debug!(
        connection_id = %ctx.connection_id,
        action = %ctx.action,
        results = results.len(),
        "Library searched"
    );
    Ok(ctx.reply(ServerMessage::LibraryResults { query, results }))
}
