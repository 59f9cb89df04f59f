/*!

This is the long-form manual for `poll_charts` and `pollcharts`.

## Input data

The input is a table with one row per constituency, as published with the
MRP polls of the 2024 general election. The following columns are required
(names are case-sensitive):

| column        | content                                          |
|---------------|--------------------------------------------------|
| `Winner2024`  | the projected winner, e.g. `Labour` or `Lib Dems` |
| `Region`      | the region of the constituency                   |
| `ConShare`    | vote share of the Conservatives                  |
| `LabShare`    | vote share of Labour                             |
| `LibDemShare` | vote share of the Liberal Democrats              |
| `GreenShare`  | vote share of the Greens                         |
| `ReformShare` | vote share of Reform UK                          |
| `PlaidShare`  | vote share of Plaid Cymru                        |
| `SNPShare`    | vote share of the SNP                            |
| `OthersShare` | vote share of all the other candidates           |
| `TotalShare`  | sum of the shares in the constituency            |

Other columns are ignored. The shares can be fractions or percentages, they
are not validated. A share that is not a number (`n/a`, an empty cell) becomes
`NaN`. By default these values propagate: a single bad cell turns the total of
its party, and the mean of its party in its region, into `NaN`. The option
`"missingValues": "skip"` leaves them out instead.

Winners are matched against the party names (`Conservatives`, `Labour`,
`Lib Dems`, `Green`, `Reform`, `Plaid`, `SNP`, `Others`), their short names
(`Con`, `Lab`, `LibDem`, ...) and some usual spellings (`Reform UK`,
`Plaid Cymru`, ...). Anything else is counted under `Others`, with a warning.

### `xlsx`

An Excel workbook. The first worksheet is read, unless `worksheetName` (or
`--excel-worksheet-name`) names another one. The first row is the header.

### `csv`

Comma Separated Values with a header row:

```text
Constituency,Winner2024,Region,ConShare,LabShare,LibDemShare,GreenShare,ReformShare,PlaidShare,SNPShare,OthersShare,TotalShare
Aberafan Maesteg,Labour,Wales,0.12,0.48,0.03,0.04,0.2,0.11,0,0.02,1
```

## Charts

* **bar**: the number of constituencies won by each party, sorted by
  decreasing number of seats. Parties that win nothing have no bar.
* **pie**: the share of the total vote of each party, in percent. The labels
  are placed outside of the pie, on the side of their wedge. Small wedges can
  be moved with the `labelOverrides` option.
* **heatmap**: the mean share of each party in each region, colored on a
  red-yellow-blue scale from 0 to 1.

## Configuration file

```json
{
  "outputSettings": {
    "title": "YouGov MRP, June 2024",
    "outputPath": "charts.json"
  },
  "dataSource": {
    "provider": "xlsx",
    "filePath": "YouGov_2024_general_election_MRP_2_cleaned.xlsx"
  },
  "options": {
    "missingValues": "propagate",
    "sortWedgesByValue": true,
    "labelOverrides": [
      { "party": "Plaid", "side": "right" },
      { "party": "Others", "side": "right", "lineOffset": -15, "labelOffset": -25 }
    ]
  }
}
```

The paths are relative to the directory of the configuration file. The pie
wedges start with the largest share; set `sortWedgesByValue` to `false` to
keep the party order instead. When
`labelOverrides` is absent, the default placements shown above are used. An
empty list disables them.

## Output

`pollcharts` writes a JSON document with the aggregated values and the
geometry of the three charts. Values that are not finite are written as
`null`.

*/
