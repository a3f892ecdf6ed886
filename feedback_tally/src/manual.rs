/*!

This is the long-form manual for `feedback_tally` and the `feedbackform` program.

## Quick start

Write a configuration file `form.json` next to where the responses should be kept:

```json
{
  "storeName": "Decisiondata",
  "createIfMissing": true,
  "title": "Team Member Feedback",
  "ratingPrompt": "How do you feel about this team member returning?",
  "ratings": ["Hell No", "No", "I Don't Care", "Sure", "Definitely"],
  "positiveRatings": ["Sure", "Definitely"]
}
```

Then create the store, collect a few answers and look at the results:

```bash
feedbackform -c form.json init
feedbackform -c form.json submit --rating Sure --comments "Happy to have them back"
feedbackform -c form.json page
feedbackform -c form.json summary --out stdout
```

`page` runs the form interactively: it shows the current results, asks for the
comments and for the rating (by number or by name), records the answer and refreshes
the results.

## Configuration

All the keys are optional.

* `storeName` name of the record store (default `Decisiondata`). The CSV backend keeps
  the responses in `<storeName>.csv`.
* `storeDirectory` where the store lives. Relative paths are resolved against the
  directory of the configuration file.
* `createIfMissing` create the store on first use instead of reporting a connection error.
* `title`, `intro`, `commentsPrompt`, `commentsPlaceholder`, `ratingPrompt`,
  `submitLabel` the text of the form.
* `ratings` the scale, from the most negative to the most positive answer.
  The labels must be distinct.
* `positiveRatings` the labels counted as positive in the summary (default: the
  last two of the scale).
* `columns` the names of the `timestamp`, `comments` and `rating` columns.

## Counting rules

The bar chart has one bar per rating of the scale, in the order of the scale, even when
nobody picked that rating. Stored rows with a blank rating, or with a rating that is not
part of the current scale (for example after the wording changed), are not charted.

They are still submissions: the "Total Responses" figure counts every stored row, and
the percentage of positive answers is computed over that total. The summary reports how
many rows were left out of the chart so that the two numbers can be reconciled.

## Input formats

The `summary` command reads the configured store by default. It can also summarize an
exported copy of the responses:

* `csv` a comma-separated file whose first row holds the column names.
* `xlsx` an Excel workbook, for example a hosted spreadsheet downloaded in Excel format.
  The first worksheet is used unless `--excel-worksheet-name` is given.

*/
