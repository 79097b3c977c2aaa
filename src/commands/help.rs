pub fn execute() -> String {
    "\
📖 mrnews commands

Charts
  mode <name>              Switch the dashboard mode (from config.json)
  category <name|all>      Filter news by category
  unit <usd|irr>           Show gold in USD or converted to IRR
  range <1d|7d|30d|...>    Time window for charts and news (all = no limit)
  hover <fx|gold> <x> <y>  Move the pointer over a chart and show its tooltip
  leave [fx|gold]          Clear the hover overlay
  legend                   Series colours and last values

News
  news                     Show the current page
  next | prev              Page forward / back
  page <n>                 Jump to page n

Other
  refresh                  Reload the snapshot
  fetch                    Rebuild fx, gold and news snapshots from upstream, then reload
  resize <w> <h>           Change the chart canvas size and reload
  status                   Current controls and load state
  help                     This message
  quit                     Exit
"
    .to_string()
}
