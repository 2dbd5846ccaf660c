use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::analysis::{quick_insight, Analyzer, ClassifierStatus};
use crate::betting::aggregate::{format_gain, DashboardStats, HistorySummary, ModalSummary};
use crate::betting::{
    dashboard_stats, generate_history, summarize_history, summarize_synthetic, HistoryOptions,
};
use crate::registry::models::{HistoricalMatch, HistoryRecord, MatchRecord};
use crate::registry::Registry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub analyzer: Analyzer,
    pub history: HistoryOptions,
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/matches", get(matches_handler))
        .route("/api/history", get(history_handler))
        .route("/api/matches/:id/history", get(match_history_handler))
        .route("/api/matches/:id/analysis", get(match_analysis_handler))
        .route("/api/matches/:id/sentiment", get(match_sentiment_handler))
        .route("/api/analysis", get(all_analysis_handler))
        .route("/api/analyze", post(analyze_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

type ApiError = (StatusCode, String);

fn find_match(state: &AppState, id: u32) -> Result<&MatchRecord, ApiError> {
    state
        .registry
        .get(id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("match {} not found", id)))
}

async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    #[serde(flatten)]
    stats: DashboardStats,
    /// "+197.0%" or "N/A"
    gain_display: String,
    classifier: ClassifierStatus,
}

/// GET /api/stats
async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = dashboard_stats(state.registry.matches());
    Json(StatsResponse {
        gain_display: format_gain(stats.percentage_gain),
        stats,
        classifier: state.analyzer.classifier_status(),
    })
}

#[derive(Debug, Serialize)]
struct MatchCard {
    #[serde(flatten)]
    record: MatchRecord,
    potential_win: f64,
    high_probability: bool,
    insight: String,
}

/// GET /api/matches
async fn matches_handler(State(state): State<Arc<AppState>>) -> Json<Vec<MatchCard>> {
    let mut rng = rand::thread_rng();
    let cards = state
        .registry
        .matches()
        .iter()
        .map(|m| MatchCard {
            potential_win: m.potential_win(),
            high_probability: m.is_high_probability(),
            insight: quick_insight(m, &mut rng),
            record: m.clone(),
        })
        .collect();
    Json(cards)
}

#[derive(Debug, Serialize)]
struct HistoryRow {
    #[serde(flatten)]
    record: HistoryRecord,
    payout: f64,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    records: Vec<HistoryRow>,
    summary: HistorySummary,
}

/// GET /api/history
async fn history_handler(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    let history = state.registry.history();
    Json(HistoryResponse {
        records: history
            .iter()
            .map(|r| HistoryRow {
                payout: r.payout(),
                record: r.clone(),
            })
            .collect(),
        summary: summarize_history(history),
    })
}

#[derive(Debug, Serialize)]
struct MatchHistoryResponse {
    player: String,
    opponent: String,
    sport: String,
    entries: Vec<HistoricalMatch>,
    summary: ModalSummary,
}

/// GET /api/matches/:id/history, freshly drawn on every request
async fn match_history_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<MatchHistoryResponse>, ApiError> {
    let m = find_match(&state, id)?;
    let entries = generate_history(
        &m.player_a,
        &m.player_b,
        Utc::now().date_naive(),
        &state.history,
        &mut rand::thread_rng(),
    );
    Ok(Json(MatchHistoryResponse {
        player: m.player_a.clone(),
        opponent: m.player_b.clone(),
        sport: m.sport.clone(),
        summary: summarize_synthetic(&entries),
        entries,
    }))
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    id: u32,
    analysis: String,
}

/// GET /api/matches/:id/analysis
async fn match_analysis_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let m = find_match(&state, id)?;
    let analysis = state.analyzer.analyze_match(m).await;
    Ok(Json(AnalysisResponse { id, analysis }))
}

/// GET /api/matches/:id/sentiment
async fn match_sentiment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<impl IntoResponse, ApiError> {
    let m = find_match(&state, id)?;
    Ok(Json(state.analyzer.sentiment_for(m).await))
}

/// GET /api/analysis: every card at once
async fn all_analysis_handler(State(state): State<Arc<AppState>>) -> Json<Vec<AnalysisResponse>> {
    let futures = state.registry.matches().iter().map(|m| {
        let analyzer = &state.analyzer;
        async move {
            AnalysisResponse {
                id: m.id,
                analysis: analyzer.analyze_match(m).await,
            }
        }
    });
    Json(futures_util::future::join_all(futures).await)
}

/// POST /api/analyze: warm the model up behind the "AI Analyze" button
async fn analyze_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let toast = state.analyzer.warm_up(state.registry.matches()).await;
    info!("Analyze requested: {}", toast.title);
    Json(toast)
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Sports Betting Dashboard</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --green: #00c896;
    --red: #ff4f6a;
    --amber: #ff9800;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); position: sticky; top: 0; background: var(--bg); z-index: 5; }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  header p { color: var(--muted); font-size: .85rem; }
  .btn { background: var(--accent); border: none; color: #fff; padding: .55rem 1.1rem; border-radius: 8px; cursor: pointer; font-weight: 600; }
  .btn:disabled { opacity: .6; cursor: wait; }
  .btn.outline { background: none; border: 1px solid var(--border); color: var(--muted); }
  .btn.outline:hover { border-color: var(--accent); color: var(--accent); }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  .stats-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 1rem; }
  .stat-card { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; }
  .stat-card .label { color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; margin-bottom: .4rem; }
  .stat-card .value { font-size: 1.7rem; font-weight: 700; }
  .stat-card .sub { color: var(--muted); font-size: .75rem; margin-top: .2rem; }
  .pos { color: var(--green); }
  .neg { color: var(--red); }
  h2 { font-size: 1.1rem; margin-bottom: .8rem; }
  .cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 1rem; }
  .match { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1rem; position: relative; display: grid; gap: .6rem; }
  .match .tag { position: absolute; top: 0; padding: .15rem .6rem; font-size: .7rem; font-weight: 700; }
  .match .tag.opted { right: 0; background: var(--accent); border-radius: 0 10px 0 8px; }
  .match .tag.high { left: 0; background: var(--green); color: #000; border-radius: 10px 0 8px 0; }
  .match .meta { display: flex; justify-content: space-between; color: var(--muted); font-size: .8rem; margin-top: .6rem; }
  .match .title { text-align: center; font-weight: 700; font-size: 1.05rem; }
  .pill { display: inline-block; padding: .15rem .55rem; border-radius: 20px; font-size: .75rem; font-weight: 600; }
  .pill.healthy, .pill.strong, .pill.win { background: rgba(0,200,150,.15); color: var(--green); }
  .pill.injured, .pill.weak, .pill.loss { background: rgba(255,79,106,.15); color: var(--red); }
  .pill.uncertain, .pill.average, .pill.draw, .pill.push { background: rgba(255,152,0,.15); color: var(--amber); }
  .bet { background: #14161f; border-radius: 8px; padding: .6rem; font-size: .85rem; display: flex; justify-content: space-between; }
  .insight { border-left: 3px solid var(--accent); padding: .5rem .7rem; font-size: .85rem; background: rgba(108,99,255,.08); display: none; }
  body.show-analysis .insight { display: block; }
  .actions { display: flex; gap: .5rem; }
  .actions .btn { flex: 1; font-size: .8rem; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; overflow: hidden; }
  table { width: 100%; border-collapse: collapse; }
  th { padding: .7rem 1rem; text-align: left; font-size: .75rem; text-transform: uppercase; color: var(--muted); border-bottom: 1px solid var(--border); }
  td { padding: .65rem 1rem; font-size: .88rem; border-bottom: 1px solid #1e2130; }
  tr:last-child td { border-bottom: none; }
  #modal { position: fixed; inset: 0; background: rgba(0,0,0,.6); display: none; align-items: center; justify-content: center; z-index: 10; }
  #modal.open { display: flex; }
  #modal .dialog { background: var(--card); border: 1px solid var(--border); border-radius: 12px; width: min(900px, 95vw); max-height: 80vh; overflow-y: auto; padding: 1.2rem; display: grid; gap: 1rem; }
  #toast { position: fixed; bottom: 1.5rem; right: 1.5rem; background: var(--card); border: 1px solid var(--accent); border-radius: 10px; padding: .8rem 1rem; display: none; max-width: 340px; }
  #toast.show { display: block; }
  #toast strong { display: block; margin-bottom: .2rem; }
</style>
</head>
<body>
<header>
  <div>
    <h1>Sports Betting Dashboard</h1>
    <p>Your personalized betting insights</p>
  </div>
  <button class="btn" id="analyze-btn" style="margin-left:auto" onclick="toggleAnalysis()">AI Analyze</button>
</header>

<main>
  <div class="stats-grid">
    <div class="stat-card"><div class="label">Active Bets</div><div class="value" id="s-active">–</div><div class="sub" id="s-active-sub"></div></div>
    <div class="stat-card"><div class="label">Total Bet Amount</div><div class="value" id="s-stake">–</div><div class="sub">across all active bets</div></div>
    <div class="stat-card"><div class="label">Potential Return</div><div class="value" id="s-return">–</div><div class="sub pos" id="s-gain"></div></div>
    <div class="stat-card"><div class="label">Available Matches</div><div class="value" id="s-available">–</div><div class="sub">new opportunities</div></div>
  </div>

  <section>
    <h2>Your Active Bets</h2>
    <div class="cards" id="opted-cards"></div>
  </section>

  <section>
    <h2>Available Opportunities</h2>
    <div class="cards" id="available-cards"></div>
  </section>

  <section>
    <h2>Match History</h2>
    <div class="stats-grid" id="history-stats"></div>
    <div class="panel" style="margin-top:1rem">
      <table>
        <thead><tr><th>Result</th><th>Match</th><th>Sport</th><th>Date</th><th>Odds</th><th>Bet</th><th>Payout</th></tr></thead>
        <tbody id="history-tbody"></tbody>
      </table>
    </div>
  </section>
</main>

<div id="modal" onclick="if (event.target === this) closeModal()">
  <div class="dialog" id="modal-body"></div>
</div>
<div id="toast"><strong id="toast-title"></strong><span id="toast-desc"></span></div>

<script>
const fmt = new Intl.NumberFormat('en-US', { style:'currency', currency:'USD', minimumFractionDigits:2 });
let showAnalysis = false;

function toast(t) {
  document.getElementById('toast-title').textContent = t.title;
  document.getElementById('toast-desc').textContent = t.description;
  const el = document.getElementById('toast');
  el.classList.add('show');
  setTimeout(() => el.classList.remove('show'), 4000);
}

async function loadStats() {
  const r = await fetch('/api/stats');
  if (!r.ok) return;
  const s = await r.json();
  document.getElementById('s-active').textContent = s.active_bets;
  document.getElementById('s-active-sub').textContent = `out of ${s.total_matches} available`;
  document.getElementById('s-stake').textContent = fmt.format(s.total_stake);
  document.getElementById('s-return').textContent = fmt.format(s.potential_return);
  document.getElementById('s-gain').textContent = `${s.gain_display} potential gain`;
  document.getElementById('s-available').textContent = s.available_matches;
}

function card(m) {
  const bet = m.opted_in && m.bet_amount != null
    ? `<div class="bet"><span>Your Bet ${fmt.format(m.bet_amount)}</span><span class="pos">Potential Win ${fmt.format(m.potential_win)}</span></div>`
    : '';
  const place = m.opted_in ? '' : `<button class="btn" onclick="toast({title:'Bet Placement',description:'Redirecting to bet placement page...'})">Place Bet (${m.odds}x)</button>`;
  return `<div class="match">
    ${m.opted_in ? '<span class="tag opted">OPTED IN</span>' : ''}
    ${m.high_probability ? '<span class="tag high">High Win Probability</span>' : ''}
    <div class="meta"><span>${m.sport} · ${m.start_time}</span><span>${m.weather}</span></div>
    <div class="title">${m.player_a} <span style="color:var(--muted)">vs</span> ${m.player_b}</div>
    <div>
      <span class="pill ${m.player_a_status}">${m.player_a}: ${m.player_a_status}</span>
      <span class="pill ${m.player_b_status}">${m.player_b}: ${m.player_b_status}</span>
      <span class="pill ${m.team_status}">Team: ${m.team_status}</span>
      <span class="pill">${m.odds}x odds</span>
    </div>
    ${bet}
    <div class="insight" id="insight-${m.id}">${m.insight}</div>
    <div class="actions">
      <button class="btn outline" onclick="openHistory(${m.id})">View History</button>
      ${place}
    </div>
  </div>`;
}

async function loadMatches() {
  const r = await fetch('/api/matches');
  if (!r.ok) return;
  const matches = await r.json();
  document.getElementById('opted-cards').innerHTML = matches.filter(m => m.opted_in).map(card).join('');
  document.getElementById('available-cards').innerHTML = matches.filter(m => !m.opted_in).map(card).join('');
}

async function loadHistory() {
  const r = await fetch('/api/history');
  if (!r.ok) return;
  const h = await r.json();
  const s = h.summary;
  const net = s.net_profit;
  document.getElementById('history-stats').innerHTML = `
    <div class="stat-card"><div class="label">Total Bet</div><div class="value">${fmt.format(s.total_staked)}</div></div>
    <div class="stat-card"><div class="label">Total Payout</div><div class="value">${fmt.format(s.total_payout)}</div></div>
    <div class="stat-card"><div class="label">Net P&L</div><div class="value ${net >= 0 ? 'pos' : 'neg'}">${net >= 0 ? '+' : ''}${fmt.format(net)}</div></div>
    <div class="stat-card"><div class="label">Win Rate</div><div class="value">${s.win_rate.toFixed(1)}%</div></div>`;
  document.getElementById('history-tbody').innerHTML = h.records.map(r => `<tr>
    <td><span class="pill ${r.result}">${r.result.toUpperCase()}</span></td>
    <td><span class="${r.winner_a ? 'pos' : ''}">${r.player_a}</span> vs <span class="${r.winner_a ? '' : 'pos'}">${r.player_b}</span></td>
    <td>${r.sport}</td>
    <td>${r.date}</td>
    <td>${r.odds}x</td>
    <td>${fmt.format(r.stake)}</td>
    <td>${fmt.format(r.payout)}</td>
  </tr>`).join('');
}

async function openHistory(id) {
  const r = await fetch(`/api/matches/${id}/history`);
  if (!r.ok) return;
  const h = await r.json();
  const s = h.summary;
  const rows = h.entries.map(e => `<tr>
    <td><span class="pill ${e.result}">${e.result.toUpperCase()}</span></td>
    <td>${e.score}</td>
    <td>${e.date}</td>
    <td>${e.venue}</td>
    <td>${e.bet ? `${fmt.format(e.bet.stake)} @ ${e.bet.odds}x` : '–'}</td>
    <td>${e.payout != null ? fmt.format(e.payout) : '–'}</td>
  </tr>`).join('');
  document.getElementById('modal-body').innerHTML = `
    <div style="display:flex;justify-content:space-between;align-items:center">
      <h2>${h.player} vs ${h.opponent} - Match History</h2>
      <button class="btn outline" onclick="closeModal()">Close</button>
    </div>
    <div class="stats-grid">
      <div class="stat-card"><div class="label">Wins</div><div class="value pos">${s.wins}</div></div>
      <div class="stat-card"><div class="label">Losses</div><div class="value neg">${s.losses}</div></div>
      <div class="stat-card"><div class="label">Draws</div><div class="value">${s.draws}</div></div>
      <div class="stat-card"><div class="label">Net P&L</div><div class="value ${s.net_profit >= 0 ? 'pos' : 'neg'}">${s.net_profit >= 0 ? '+' : ''}${fmt.format(s.net_profit)}</div></div>
    </div>
    <div class="panel"><table>
      <thead><tr><th>Result</th><th>Score</th><th>Date</th><th>Venue</th><th>Bet</th><th>Payout</th></tr></thead>
      <tbody>${rows}</tbody>
    </table></div>`;
  document.getElementById('modal').classList.add('open');
}

function closeModal() {
  document.getElementById('modal').classList.remove('open');
}

async function loadAnalysis() {
  const ids = [...document.querySelectorAll('.insight')].map(el => el.id.replace('insight-', ''));
  ids.forEach(id => { document.getElementById(`insight-${id}`).textContent = 'AI analyzing match data...'; });
  await Promise.all(ids.map(async id => {
    const r = await fetch(`/api/matches/${id}/analysis`);
    if (!r.ok) return;
    const a = await r.json();
    document.getElementById(`insight-${id}`).textContent = a.analysis;
  }));
}

async function toggleAnalysis() {
  const btn = document.getElementById('analyze-btn');
  btn.disabled = true;
  btn.textContent = 'AI Analyzing...';
  try {
    const r = await fetch('/api/analyze', { method: 'POST' });
    toast(r.ok ? await r.json() : { title: 'Analysis Ready', description: 'Betting insights generated successfully.' });
  } catch (e) {
    toast({ title: 'Analysis Ready', description: 'Betting insights generated successfully.' });
  }
  showAnalysis = !showAnalysis;
  document.body.classList.toggle('show-analysis', showAnalysis);
  if (showAnalysis) loadAnalysis();
  btn.disabled = false;
  btn.textContent = showAnalysis ? 'Hide Analysis' : 'AI Analyze';
}

loadStats();
loadMatches();
loadHistory();
</script>
</body>
</html>"#;
