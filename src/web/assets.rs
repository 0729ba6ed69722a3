//! Inline stylesheet and browser script for the browse page.

pub const STYLE: &str = r#"
:root {
  color-scheme: light dark;
  --fg: #1f2328;
  --bg: #ffffff;
  --muted: #6b7280;
  --card: #f6f7f9;
  --accent: #111827;
  --danger: #b91c1c;
}
@media (prefers-color-scheme: dark) {
  :root { --fg: #e5e7eb; --bg: #0f1115; --muted: #9ca3af; --card: #1a1d23; --accent: #f3f4f6; }
}
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; color: var(--fg); background: var(--bg); }
.container { max-width: 1200px; margin: 0 auto; padding: 2rem 1rem; }
h1 { font-size: 1.875rem; margin: 0 0 .5rem; }
.subtitle { color: var(--muted); margin: 0 0 1.5rem; }
.search { display: flex; gap: .5rem; margin-bottom: 1.5rem; }
.search input { flex: 1; padding: .6rem .8rem; border-radius: .5rem; border: 1px solid var(--muted); background: transparent; color: inherit; }
.btn { padding: .6rem 1rem; border: 0; border-radius: .5rem; background: var(--accent); color: var(--bg); cursor: pointer; width: 100%; }
.search .btn { width: auto; }
.btn[disabled] { opacity: .6; cursor: progress; }
.grid { display: grid; grid-template-columns: 1fr; gap: 1.5rem; }
@media (min-width: 768px) { .grid { grid-template-columns: repeat(2, 1fr); } }
@media (min-width: 1024px) { .grid { grid-template-columns: repeat(3, 1fr); } }
.card { display: flex; flex-direction: column; background: var(--card); border-radius: .75rem; overflow: hidden; }
.card-media { height: 12rem; background: var(--muted); }
.card-media img { width: 100%; height: 100%; object-fit: cover; display: block; }
.card-body { padding: 1.25rem 1.25rem .5rem; flex-grow: 1; }
.card-meta { display: flex; justify-content: space-between; font-size: .875rem; color: var(--muted); margin-bottom: .5rem; }
.card-title { font-size: 1.125rem; margin: 0 0 .5rem; display: -webkit-box; -webkit-line-clamp: 2; -webkit-box-orient: vertical; overflow: hidden; }
.card-publisher { font-size: .875rem; color: var(--muted); margin: 0 0 .5rem; }
.card-description { font-size: .875rem; margin: 0; display: -webkit-box; -webkit-line-clamp: 3; -webkit-box-orient: vertical; overflow: hidden; }
.card-footer { padding: 0 1.25rem 1.25rem; }
.summary { background: var(--card); border-radius: .75rem; padding: 1.25rem; margin-bottom: 1.5rem; }
.summary h3 { margin: 0 0 .25rem; font-size: 1.25rem; }
.summary .publisher { color: var(--muted); font-size: .875rem; margin-bottom: 1rem; }
.summary .prose p { margin: 0 0 .75rem; line-height: 1.6; }
.alert { border: 1px solid var(--danger); color: var(--danger); border-radius: .5rem; padding: .75rem 1rem; display: flex; justify-content: space-between; align-items: center; }
.alert button { background: none; border: 0; color: inherit; cursor: pointer; font-size: 1.1rem; }
.skeleton { background: var(--muted); opacity: .25; border-radius: .375rem; height: 1rem; margin-bottom: .5rem; animation: pulse 1.5s ease-in-out infinite; }
.skeleton-card { padding: 0 0 1rem; background: transparent; }
.h-4 { height: 1rem; } .h-6 { height: 1.5rem; } .h-8 { height: 2rem; } .h-10 { height: 2.5rem; } .h-48 { height: 12rem; }
.w-1-2 { width: 50%; } .w-3-4 { width: 75%; }
@keyframes pulse { 50% { opacity: .1; } }
.sentinel { display: flex; justify-content: center; padding: 1rem 0; min-height: 1px; }
.spinner { width: 2rem; height: 2rem; border-radius: 50%; border: 2px solid transparent; border-top-color: var(--fg); border-bottom-color: var(--fg); animation: spin 1s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
.end, .empty { text-align: center; color: var(--muted); padding: 1rem 0; grid-column: 1 / -1; }
.toasts { position: fixed; top: 1rem; right: 1rem; display: flex; flex-direction: column; gap: .5rem; z-index: 10; }
.toast { padding: .75rem 1rem; border-radius: .5rem; background: var(--accent); color: var(--bg); box-shadow: 0 4px 12px rgba(0,0,0,.2); }
.toast.error { background: var(--danger); color: #fff; }
"#;

pub const SCRIPT: &str = r#"
(() => {
  const grid = document.getElementById('grid');
  const sentinel = document.getElementById('sentinel');
  const spinner = sentinel.querySelector('.spinner');
  const endMessage = document.getElementById('end');
  const panel = document.getElementById('summary');
  const form = document.getElementById('search');
  const input = document.getElementById('search-input');

  const state = { page: 0, query: '', hasMore: true, loading: false, generation: 0, summarizing: null };

  function toast(message, kind) {
    const el = document.createElement('div');
    el.className = 'toast' + (kind === 'error' ? ' error' : '');
    el.textContent = message;
    document.getElementById('toasts').appendChild(el);
    setTimeout(() => el.remove(), 4000);
  }

  function cloneTemplate(id) {
    return document.getElementById(id).content.cloneNode(true);
  }

  // A reset starts a new generation; responses from older generations are dropped.
  async function loadPage(reset) {
    if (!reset && (state.loading || !state.hasMore)) return;
    if (reset) {
      state.generation += 1;
      state.page = 0;
      state.hasMore = true;
      grid.replaceChildren(cloneTemplate('card-skeletons'));
      endMessage.hidden = true;
    } else {
      spinner.hidden = false;
    }
    const generation = state.generation;
    const page = state.page + 1;
    const params = new URLSearchParams({ page: String(page) });
    if (state.query) params.set('query', state.query);
    state.loading = true;
    try {
      const response = await fetch('/partials/podcasts?' + params.toString());
      if (!response.ok) throw new Error('Failed to fetch podcasts');
      const text = await response.text();
      if (generation !== state.generation) return;
      const holder = document.createElement('template');
      holder.innerHTML = text;
      const fragment = holder.content.firstElementChild;
      if (reset) grid.replaceChildren();
      if (fragment) {
        grid.append(...fragment.children);
        state.hasMore = fragment.dataset.hasMore === 'true';
      } else {
        state.hasMore = false;
      }
      state.page = page;
      endMessage.hidden = state.hasMore || !grid.querySelector('.card');
    } catch (err) {
      if (generation !== state.generation) return;
      console.error(err);
      if (reset) grid.replaceChildren();
      state.hasMore = false;
      toast('Failed to fetch podcasts', 'error');
    } finally {
      if (generation === state.generation) {
        state.loading = false;
        spinner.hidden = true;
        rearmSentinel();
      }
    }
  }

  const observer = new IntersectionObserver((entries) => {
    if (entries.some((e) => e.isIntersecting)) loadPage(false);
  }, { rootMargin: '200px' });

  // Observing again reports the current intersection, so a sentinel that is
  // still on screen after a load triggers the next page.
  function rearmSentinel() {
    observer.unobserve(sentinel);
    if (state.hasMore) observer.observe(sentinel);
  }

  function showSummaryLoading() {
    panel.hidden = false;
    panel.replaceChildren(cloneTemplate('summary-skeleton'));
  }

  function showSummary(summary, episode) {
    const heading = document.createElement('h3');
    heading.textContent = episode.title ? episode.title + ' - Summary' : 'Podcast Summary';
    const publisher = document.createElement('div');
    publisher.className = 'publisher';
    publisher.textContent = episode.publisher || '';
    const prose = document.createElement('div');
    prose.className = 'prose';
    for (const line of summary.summary.split('\n')) {
      if (line.trim()) {
        const p = document.createElement('p');
        p.textContent = line;
        prose.appendChild(p);
      } else {
        prose.appendChild(document.createElement('br'));
      }
    }
    panel.hidden = false;
    panel.replaceChildren(heading, publisher, prose);
  }

  function showSummaryError(message) {
    const alert = document.createElement('div');
    alert.className = 'alert';
    alert.setAttribute('role', 'alert');
    const text = document.createElement('span');
    text.textContent = message;
    const dismiss = document.createElement('button');
    dismiss.type = 'button';
    dismiss.setAttribute('aria-label', 'Dismiss');
    dismiss.textContent = '×';
    dismiss.addEventListener('click', () => { panel.hidden = true; panel.replaceChildren(); });
    alert.append(text, dismiss);
    panel.hidden = false;
    panel.replaceChildren(alert);
  }

  async function summarize(button) {
    const episode = {
      id: button.dataset.id,
      title: button.dataset.title,
      publisher: button.dataset.publisher,
    };
    if (state.summarizing) return;
    state.summarizing = episode.id;
    button.disabled = true;
    button.textContent = 'Summarizing...';
    showSummaryLoading();
    try {
      const existing = await fetch('/api/summary?id=' + encodeURIComponent(episode.id));
      if (existing.ok) {
        const data = await existing.json();
        showSummary(data.summary, episode);
        return;
      }
      const generated = await fetch('/api/summary', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ podcastId: episode.id }),
      });
      if (!generated.ok) throw new Error('Failed to generate summary');
      const data = await generated.json();
      showSummary(data.summary, episode);
      toast('Summary generated successfully!');
    } catch (err) {
      console.error(err);
      showSummaryError('Failed to generate summary. Please try again.');
      toast('Failed to generate summary', 'error');
    } finally {
      state.summarizing = null;
      button.disabled = false;
      button.textContent = 'Summarize';
    }
  }

  grid.addEventListener('click', (event) => {
    const button = event.target.closest('button[data-summarize]');
    if (button) summarize(button);
  });

  form.addEventListener('submit', (event) => {
    event.preventDefault();
    state.query = input.value.trim();
    loadPage(true);
  });

  loadPage(true);
})();
"#;
