/*!

This is the long-form manual for `contest_scoring` and `contestscore`.

## Grade labels

A grade label is resolved to a [GradeMask](crate::GradeMask): bit `b` stands for
the grade level `b - 16`, level 0 being the first year of middle school.

Two kinds of labels exist:
* irregular labels, listed with their mask directly (for instance `"小学/无"`,
  primary school or no school at all, which sets many bits);
* regular labels, read with a grammar of tokens. Each token adds a delta to a
  running bit position starting at `initial`. Tokens are tried in the order of
  the file and the first one matching the front of the label is consumed.

With `initial = 16`, `初 = -1`, `高 = 2`, `一 = 1`, `二 = 2`, `三 = 3`, the label
`高二` reads as bit `16 + 2 + 2 = 20`, the second year of high school.

A label that cannot be consumed entirely is an error. The record carrying it is
skipped, the rest of the award list is still processed.

## Enrollment years

A grade level `g` during school year `y` means a middle-school enrollment in
year `y - g + 1`. Every record gives a set of candidate years with a priority of
2, except the middle/high school readings of the "primary school or nothing"
label which only get 1. The priorities of all the records of a contestant are
summed, and all the years with the largest total are returned.

## Coefficients

For each result:
* the rank coefficient comes from a table of 401 decreasing values, from 100 for
  the best relative rank down to 0. A rank lands at index
  `floor(400 * (rank - 1) / total)`, so the winner always gets the first entry,
  even when alone. Placing it at `floor(400 * rank / total)` instead would send
  rank 1 of 1 to the last entry (index 400, a coefficient of 0);
* the contest type coefficient comes from the scoring table. Unknown contest
  types count for 0 and are reported;
* the decay coefficient is `1.25^(year - 2000)`. Very old years bottom out at
  the smallest positive decimal (`1e-28`). Years past 2298 no longer fit in a
  decimal: they saturate to the largest one and are reported.

Ranks outside of `[1, total]` are clamped and reported. The number of
participants must be at least 1. The three values are multiplied together by
`contestscore`, which skips the records with no participants or whose score
overflows and lists them under `errors`.

## `contestscore` configuration

`contestscore --config path/to/config.json` reads a JSON file of the form:

```text
{
  "grades": "grades.json",
  "scoring": "scoring.json",
  "surnames": "surnames.json",
  "contests": "contests.json",
  "records": "records.json"
}
```

All the paths are relative to the directory of the configuration file.

### `grades`

```text
{ "initial": 16,
  "element": { "初": -1, "高": 2, "一": 1, "二": 2, "三": 3 },
  "special": { "小学/无": 4290837504 } }
```

### `scoring`

Contest type to coefficient, as strings to keep them exact:
`{ "NOI": "1.5", "NOIP提高": "0.8" }`.

### `surnames`

Surname to initials: `{ "单": "s", "尉迟": "yc" }`. A list of initials
(`["y", "c"]`) is also accepted.

### `contests`

`[{ "id": "NOIP2021", "type": "NOIP提高", "year": 2021, "schoolYear": 2021 }]`.
`schoolYear` is optional and defaults to `year`.

### `records`

`[{ "contest": "NOIP2021", "name": "张三", "grade": "初二", "rank": 3, "total": 120 }]`.
*/
